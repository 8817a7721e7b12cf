//! Quark is a tiny single-volume file system over a raw fixed-block device.
//! It exposes a flat namespace of named files; no directory hierarchy,
//! permissions, or timestamps.
//!
//! Quark's linear on-disk layout:
//! - Block 0: Superblock
//! - Block 1: Inode table (one fixed-size record per inode)
//! - Block 2: Free-block bitmap (one bit per block)
//! - Block 3: Directory table (one fixed-size record per slot)
//! - Blocks 4+: File data, allocated on demand
//!
//! Layers (from bottom to top):
//! 1. Block Device: abstraction for low level devices.   | User implemented (hardware-specific)
//! 2. Bitmap/Inode/Directory tables: metadata records.   | Fs implemented
//! 3. Open-file table: handles with read/write cursors.  | Fs implemented
//! 4. FileSystem: the facade users drive.                | Fs implemented
//!
//! Files grow block-by-block on demand up to the direct-slot capacity;
//! the inode reserves an indirect reference but never exercises it.
//! Execution is single-threaded and synchronous: callers serialize, and
//! metadata blocks are rewritten wholesale after each mutating operation.

mod bitmap;
mod block_dev;
mod config;
mod directory;
mod error;
mod fs;
mod inode;
mod ofile;
mod structs;
mod superblock;

pub use bitmap::Bitmap;
pub use block_dev::BlockDevice;
pub use config::*;
pub use directory::DirectoryTable;
pub use error::FsError as Error;
pub use error::{FsError, Result};
pub use fs::FileSystem;
pub use inode::InodeTable;
pub use ofile::{OpenFileHandle, OpenFileTable};
pub use structs::*;
pub use superblock::{read_superblock, write_superblock};

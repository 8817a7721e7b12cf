//! On-disk records and their byte-level codecs.
//!
//! Every record is encoded with explicit little-endian field access into a
//! caller-provided slice; nothing here touches the device. Absent block
//! references are `None` in memory and encode as `u32::MAX` on disk so a
//! valid block index can never collide with the marker.

use crate::config::*;
use crate::error::{FsError, Result};

/// On-disk marker for an absent block reference.
const NO_REF: u32 = u32::MAX;

fn read_u32(buf: &[u8], off: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[off..off + 4]);
    u32::from_le_bytes(bytes)
}

fn write_u32(buf: &mut [u8], off: usize, value: u32) {
    buf[off..off + 4].copy_from_slice(&value.to_le_bytes());
}

fn decode_ref(raw: u32) -> Option<u32> {
    if raw == NO_REF { None } else { Some(raw) }
}

fn encode_ref(slot: Option<u32>) -> u32 {
    slot.unwrap_or(NO_REF)
}

/// Strip trailing NUL padding from a fixed-size name field.
pub fn trim_zero(name: &[u8]) -> &[u8] {
    let mut end = name.len();
    while end > 0 && name[end - 1] == 0 {
        end -= 1;
    }
    &name[..end]
}

/// Volume geometry record in block 0. Written once at format time and
/// read-only thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperBlock {
    pub magic: u32,
    pub block_size: u32,
    pub num_blocks: u32,
    pub num_inodes: u32,
}

impl SuperBlock {
    pub const DISK_SIZE: usize = 16;

    pub fn encode(&self, buf: &mut [u8]) {
        write_u32(buf, 0, self.magic);
        write_u32(buf, 4, self.block_size);
        write_u32(buf, 8, self.num_blocks);
        write_u32(buf, 12, self.num_inodes);
    }

    pub fn decode(buf: &[u8]) -> Self {
        Self {
            magic: read_u32(buf, 0),
            block_size: read_u32(buf, 4),
            num_blocks: read_u32(buf, 8),
            num_inodes: read_u32(buf, 12),
        }
    }
}

/// Per-file metadata record.
///
/// The indirect slot is a reserved extension point and is never populated;
/// file size is capped at `NUM_DIRECT_PTRS * BLOCK_SIZE` instead.
///
/// Record layout (64 bytes): flags u32, size u32, indirect u32,
/// 12 direct refs u32 each, 4 bytes padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub in_use: bool,
    pub size: u32,
    pub indirect: Option<u32>,
    pub direct: [Option<u32>; NUM_DIRECT_PTRS],
}

impl Inode {
    pub const FREE: Self = Self {
        in_use: false,
        size: 0,
        indirect: None,
        direct: [None; NUM_DIRECT_PTRS],
    };

    /// Encodes into a 64-byte record slice.
    pub fn encode(&self, rec: &mut [u8]) {
        write_u32(rec, 0, self.in_use as u32);
        write_u32(rec, 4, self.size);
        write_u32(rec, 8, encode_ref(self.indirect));
        for (i, slot) in self.direct.iter().enumerate() {
            write_u32(rec, 12 + i * 4, encode_ref(*slot));
        }
    }

    /// Decodes from a 64-byte record slice.
    pub fn decode(rec: &[u8]) -> Self {
        let mut direct = [None; NUM_DIRECT_PTRS];
        for (i, slot) in direct.iter_mut().enumerate() {
            *slot = decode_ref(read_u32(rec, 12 + i * 4));
        }
        Self {
            in_use: read_u32(rec, 0) != 0,
            size: read_u32(rec, 4),
            indirect: decode_ref(read_u32(rec, 8)),
            direct,
        }
    }
}

/// One slot of the flat namespace: file name -> inode id.
///
/// Record layout (64 bytes): inode id u32, in-use u8, 3 bytes padding,
/// NUL-padded name of up to 56 bytes.
#[derive(Debug, Clone, Copy)]
pub struct DirEntry {
    pub inode_id: u32,
    pub in_use: bool,
    pub name: [u8; MAX_FILE_NAME_LEN],
}

impl DirEntry {
    pub const EMPTY: Self = Self {
        inode_id: 0,
        in_use: false,
        name: [0; MAX_FILE_NAME_LEN],
    };

    pub fn new(inode_id: u32, name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.is_empty() || bytes.len() > MAX_FILE_NAME_LEN || bytes.contains(&0) {
            return Err(FsError::NameTooLong);
        }
        let mut arr = [0; MAX_FILE_NAME_LEN];
        arr[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            inode_id,
            in_use: true,
            name: arr,
        })
    }

    /// The stored name without its NUL padding.
    pub fn name(&self) -> &[u8] {
        trim_zero(&self.name)
    }

    /// Exact, case-sensitive name comparison.
    pub fn name_eq(&self, name: &str) -> bool {
        self.name() == name.as_bytes()
    }

    /// Encodes into a 64-byte record slice.
    pub fn encode(&self, rec: &mut [u8]) {
        write_u32(rec, 0, self.inode_id);
        rec[4] = self.in_use as u8;
        rec[5..8].fill(0);
        rec[8..8 + MAX_FILE_NAME_LEN].copy_from_slice(&self.name);
    }

    /// Decodes from a 64-byte record slice.
    pub fn decode(rec: &[u8]) -> Self {
        let mut name = [0; MAX_FILE_NAME_LEN];
        name.copy_from_slice(&rec[8..8 + MAX_FILE_NAME_LEN]);
        Self {
            inode_id: read_u32(rec, 0),
            in_use: rec[4] != 0,
            name,
        }
    }
}

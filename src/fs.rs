//! The file-system facade: validates requests, consults the metadata
//! tables, and spans blocks for data operations.
//!
//! All metadata lives in memory, exclusively owned by the facade, and is
//! mirrored to the device by rewriting the whole relevant metadata block
//! after each mutating operation. Callers must serialize their calls;
//! there is no internal locking and no crash-consistency guarantee.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::bitmap::Bitmap;
use crate::config::*;
use crate::directory::DirectoryTable;
use crate::error::{FsError, Result};
use crate::inode::InodeTable;
use crate::ofile::OpenFileTable;
use crate::structs::SuperBlock;
use crate::superblock::{read_superblock, write_superblock};
use crate::BlockDevice;

#[derive(Debug)]
pub struct FileSystem<D: BlockDevice> {
    device: Arc<D>,
    superblock: SuperBlock,
    bitmap: Bitmap,
    inodes: InodeTable,
    directory: DirectoryTable,
    ofiles: OpenFileTable,
}

impl<D: BlockDevice> FileSystem<D> {
    /// Formats a fresh volume on the device and mounts it.
    ///
    /// Writes the superblock, marks the four metadata blocks used in the
    /// bitmap, points inode 0 at the directory block, and zeroes the
    /// directory table.
    pub fn format(device: Arc<D>) -> Result<Self> {
        let num_blocks = device.num_blocks();
        if num_blocks <= DATA_START || num_blocks > MAX_VOLUME_BLOCKS {
            return Err(FsError::InvalidBlockId);
        }

        let superblock = SuperBlock {
            magic: MAGIC,
            block_size: BLOCK_SIZE as u32,
            num_blocks: num_blocks as u32,
            num_inodes: NUM_INODES as u32,
        };

        let mut bitmap = Bitmap::new(num_blocks);
        for block_id in 0..DATA_START {
            bitmap.mark_used(block_id)?;
        }
        let inodes = InodeTable::new();
        let directory = DirectoryTable::new();

        write_superblock(&*device, &superblock)?;
        bitmap.store(&*device)?;
        inodes.store(&*device)?;
        directory.store(&*device)?;
        device.flush()?;

        debug!(num_blocks, "formatted fresh volume");
        Ok(Self {
            device,
            superblock,
            bitmap,
            inodes,
            directory,
            ofiles: OpenFileTable::new(),
        })
    }

    /// Mounts an existing volume: validates the superblock and hydrates
    /// the in-memory bitmap, inode table, and directory table from their
    /// persisted blocks. Open handles do not survive a remount.
    pub fn mount(device: Arc<D>) -> Result<Self> {
        let superblock = read_superblock(&*device)?;
        let bitmap = Bitmap::load(&*device)?;
        let inodes = InodeTable::load(&*device)?;
        let directory = DirectoryTable::load(&*device)?;

        debug!(num_blocks = superblock.num_blocks, "mounted existing volume");
        Ok(Self {
            device,
            superblock,
            bitmap,
            inodes,
            directory,
            ofiles: OpenFileTable::new(),
        })
    }

    /// Allocates an inode and a directory entry for a new empty file.
    pub fn create(&mut self, name: &str) -> Result<u32> {
        let inode_id = self.inodes.allocate()?;
        if let Err(e) = self.directory.insert(name, inode_id) {
            self.inodes.free(inode_id)?;
            return Err(e);
        }
        self.inodes.store(&*self.device)?;
        self.directory.store(&*self.device)?;
        debug!(name, inode_id, "created file");
        Ok(inode_id)
    }

    /// Opens a file, creating it first if it does not exist. The read
    /// cursor starts at 0 and the write cursor at the current file size.
    pub fn open(&mut self, name: &str) -> Result<usize> {
        let inode_id = match self.directory.lookup(name) {
            Ok(id) => id,
            Err(FsError::NotFound) => self.create(name)?,
            Err(e) => return Err(e),
        };
        if self.ofiles.is_open(inode_id) {
            return Err(FsError::AlreadyOpen);
        }
        let size = self.inodes.get(inode_id)?.size as usize;
        let fd = self.ofiles.allocate(inode_id, size)?;
        debug!(name, inode_id, fd, "opened file");
        Ok(fd)
    }

    /// Releases the handle. Fails if it is already free or out of range.
    pub fn close(&mut self, fd: usize) -> Result<()> {
        self.ofiles.release(fd)?;
        debug!(fd, "closed handle");
        Ok(())
    }

    /// Moves the read cursor. Does not touch storage.
    pub fn seek_read(&mut self, fd: usize, pos: usize) -> Result<()> {
        let inode_id = self.ofiles.get(fd)?.inode_id;
        if pos > self.inodes.get(inode_id)?.size as usize {
            return Err(FsError::OutOfRange);
        }
        self.ofiles.get_mut(fd)?.read_pos = pos;
        Ok(())
    }

    /// Moves the write cursor. Does not allocate or touch storage.
    pub fn seek_write(&mut self, fd: usize, pos: usize) -> Result<()> {
        let inode_id = self.ofiles.get(fd)?.inode_id;
        if pos > self.inodes.get(inode_id)?.size as usize {
            return Err(FsError::OutOfRange);
        }
        self.ofiles.get_mut(fd)?.write_pos = pos;
        Ok(())
    }

    /// Writes `bytes` at the handle's write cursor, allocating direct
    /// blocks on demand and overlaying each affected block with
    /// length-bounded byte-slice composition. Bytes outside the write's
    /// span are left untouched; zero-valued bytes round-trip exactly.
    ///
    /// Advances the write cursor by `bytes.len()` and grows the file size
    /// to `max(size, write_pos + len)`.
    pub fn write(&mut self, fd: usize, bytes: &[u8]) -> Result<usize> {
        let handle = *self.ofiles.get(fd)?;
        let len = bytes.len();
        if len == 0 {
            return Ok(0);
        }

        let wp = handle.write_pos;
        if wp + len > MAX_FSIZE {
            return Err(FsError::CapacityExceeded);
        }

        let mut inode = *self.inodes.get(handle.inode_id)?;

        // Inclusive block range; (wp + len) / BLOCK_SIZE would over-allocate
        // an unused trailing block at exact boundaries.
        let first = wp / BLOCK_SIZE;
        let last = (wp + len - 1) / BLOCK_SIZE;

        // Check the whole unmapped range up front so a failed write never
        // leaves blocks marked used with no inode referencing them.
        let needed = (first..=last).filter(|&b| inode.direct[b].is_none()).count();
        if self.bitmap.count_free() < needed {
            return Err(FsError::OutOfSpace);
        }

        let mut buf = vec![0u8; BLOCK_SIZE];
        for b in first..=last {
            let (block_id, fresh) = match inode.direct[b] {
                Some(id) => (id as usize, false),
                None => {
                    let id = self.bitmap.find_first_free()?;
                    self.bitmap.mark_used(id)?;
                    inode.direct[b] = Some(id as u32);
                    (id, true)
                }
            };

            if fresh {
                buf.fill(0);
            } else {
                self.device.read_block(block_id, &mut buf)?;
            }

            let block_start = b * BLOCK_SIZE;
            let lo = wp.max(block_start) - block_start;
            let hi = (wp + len).min(block_start + BLOCK_SIZE) - block_start;
            let src = block_start + lo - wp;
            buf[lo..hi].copy_from_slice(&bytes[src..src + (hi - lo)]);
            self.device.write_block(block_id, &buf)?;
        }

        inode.size = inode.size.max((wp + len) as u32);
        *self.inodes.get_mut(handle.inode_id)? = inode;
        self.ofiles.get_mut(fd)?.write_pos = wp + len;

        self.inodes.store(&*self.device)?;
        self.bitmap.store(&*self.device)?;

        trace!(fd, wp, len, size = inode.size, "write");
        Ok(len)
    }

    /// Reads up to `len` bytes from the handle's read cursor, clamped to
    /// the remaining file size, and advances the cursor by the amount
    /// actually read.
    pub fn read(&mut self, fd: usize, len: usize) -> Result<Vec<u8>> {
        let handle = *self.ofiles.get(fd)?;
        let inode = *self.inodes.get(handle.inode_id)?;

        let rp = handle.read_pos;
        let effective = len.min((inode.size as usize).saturating_sub(rp));
        if effective == 0 {
            return Ok(Vec::new());
        }

        let first = rp / BLOCK_SIZE;
        let last = (rp + effective - 1) / BLOCK_SIZE;

        let mut out = Vec::with_capacity(effective);
        let mut buf = vec![0u8; BLOCK_SIZE];
        for b in first..=last {
            // Every block below a well-formed size is mapped and within the
            // direct slots; an unmapped or out-of-range block here means the
            // stored size field does not match the block references.
            let block_id = inode
                .direct
                .get(b)
                .copied()
                .flatten()
                .ok_or(FsError::CorruptVolume)? as usize;
            self.device.read_block(block_id, &mut buf)?;

            let block_start = b * BLOCK_SIZE;
            let lo = rp.max(block_start) - block_start;
            let hi = (rp + effective).min(block_start + BLOCK_SIZE) - block_start;
            out.extend_from_slice(&buf[lo..hi]);
        }

        self.ofiles.get_mut(fd)?.read_pos = rp + effective;

        trace!(fd, rp, effective, "read");
        Ok(out)
    }

    /// Removes a file by name: releases its data blocks to the bitmap,
    /// frees its inode, compacts the directory, and invalidates any open
    /// handle referencing it. The file does not need to be open.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let inode_id = self.directory.remove(name)?;
        let inode = *self.inodes.get(inode_id)?;
        for block_id in inode.direct.iter().flatten() {
            self.bitmap.mark_free(*block_id as usize)?;
        }
        self.inodes.free(inode_id)?;
        self.ofiles.invalidate_inode(inode_id);

        self.bitmap.store(&*self.device)?;
        self.inodes.store(&*self.device)?;
        self.directory.store(&*self.device)?;

        debug!(name, inode_id, "removed file");
        Ok(())
    }

    /// Current size in bytes of the named file.
    pub fn size(&self, name: &str) -> Result<usize> {
        let inode_id = self.directory.lookup(name)?;
        Ok(self.inodes.get(inode_id)?.size as usize)
    }

    /// Yields the next live file name from the shared enumeration cursor,
    /// or `None` once every name has been seen (which also restarts the
    /// sequence).
    pub fn list_next(&mut self) -> Option<String> {
        self.directory.next_name()
    }

    pub fn superblock(&self) -> &SuperBlock {
        &self.superblock
    }

    pub fn free_blocks(&self) -> usize {
        self.bitmap.count_free()
    }

    pub fn device(&self) -> Arc<D> {
        Arc::clone(&self.device)
    }
}

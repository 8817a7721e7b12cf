//! The open-file-handle table. Purely in-memory: handles do not survive a
//! remount and are invalidated when their backing file is removed.

use crate::config::NUM_INODES;
use crate::error::{FsError, Result};

/// An open file: an inode paired with independent read/write cursors.
#[derive(Debug, Clone, Copy)]
pub struct OpenFileHandle {
    pub inode_id: u32,
    pub read_pos: usize,
    pub write_pos: usize,
}

#[derive(Debug)]
pub struct OpenFileTable {
    slots: [Option<OpenFileHandle>; NUM_INODES],
}

impl OpenFileTable {
    pub fn new() -> Self {
        Self {
            slots: [None; NUM_INODES],
        }
    }

    /// Whether a live handle already references the inode. At most one may
    /// at a time.
    pub fn is_open(&self, inode_id: u32) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|handle| handle.inode_id == inode_id)
    }

    /// Takes the first free slot. The read cursor starts at 0; the caller
    /// supplies the write cursor (current file size, append-by-default).
    pub fn allocate(&mut self, inode_id: u32, write_pos: usize) -> Result<usize> {
        for (fd, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(OpenFileHandle {
                    inode_id,
                    read_pos: 0,
                    write_pos,
                });
                return Ok(fd);
            }
        }
        Err(FsError::TableFull)
    }

    pub fn get(&self, fd: usize) -> Result<&OpenFileHandle> {
        self.slots
            .get(fd)
            .and_then(|slot| slot.as_ref())
            .ok_or(FsError::InvalidHandle)
    }

    pub fn get_mut(&mut self, fd: usize) -> Result<&mut OpenFileHandle> {
        self.slots
            .get_mut(fd)
            .and_then(|slot| slot.as_mut())
            .ok_or(FsError::InvalidHandle)
    }

    /// Fails if the handle is already free or out of range.
    pub fn release(&mut self, fd: usize) -> Result<()> {
        let slot = self.slots.get_mut(fd).ok_or(FsError::InvalidHandle)?;
        if slot.is_none() {
            return Err(FsError::InvalidHandle);
        }
        *slot = None;
        Ok(())
    }

    /// Drops any handle referencing the inode (its file was removed).
    pub fn invalidate_inode(&mut self, inode_id: u32) {
        for slot in self.slots.iter_mut() {
            if slot.is_some_and(|handle| handle.inode_id == inode_id) {
                *slot = None;
            }
        }
    }
}

//! The flat directory table: name -> inode id, persisted wholesale in its
//! dedicated block.
//!
//! Removal compacts the table so live entries always occupy a contiguous
//! prefix in their original relative order. That keeps the enumeration
//! cursor's count-based wraparound correct without tombstone skipping.

use crate::config::*;
use crate::error::{FsError, Result};
use crate::structs::DirEntry;
use crate::BlockDevice;

#[derive(Debug, Clone)]
pub struct DirectoryTable {
    entries: [DirEntry; NUM_INODES],
    /// Enumeration cursor shared by all callers, in [0, live_count].
    cursor: usize,
}

impl DirectoryTable {
    pub fn new() -> Self {
        Self {
            entries: [DirEntry::EMPTY; NUM_INODES],
            cursor: 0,
        }
    }

    /// Linear scan over in-use entries; comparison is exact and
    /// case-sensitive.
    pub fn lookup(&self, name: &str) -> Result<u32> {
        self.entries
            .iter()
            .find(|entry| entry.in_use && entry.name_eq(name))
            .map(|entry| entry.inode_id)
            .ok_or(FsError::NotFound)
    }

    /// Inserts into the first free slot.
    pub fn insert(&mut self, name: &str, inode_id: u32) -> Result<usize> {
        if self.lookup(name).is_ok() {
            return Err(FsError::AlreadyExists);
        }
        let entry = DirEntry::new(inode_id, name)?;
        for (index, slot) in self.entries.iter_mut().enumerate() {
            if !slot.in_use {
                *slot = entry;
                return Ok(index);
            }
        }
        Err(FsError::TableFull)
    }

    /// Clears the named entry and compacts the table. Returns the inode id
    /// the entry referenced.
    pub fn remove(&mut self, name: &str) -> Result<u32> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.in_use && entry.name_eq(name))
            .ok_or(FsError::NotFound)?;
        let inode_id = self.entries[index].inode_id;
        self.entries[index] = DirEntry::EMPTY;
        self.compact();
        Ok(inode_id)
    }

    /// Shifts in-use entries toward index 0, preserving relative order.
    fn compact(&mut self) {
        let mut next = 0;
        for index in 0..NUM_INODES {
            if self.entries[index].in_use {
                if index != next {
                    self.entries[next] = self.entries[index];
                    self.entries[index] = DirEntry::EMPTY;
                }
                next += 1;
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.in_use).count()
    }

    /// Yields the next live name, or `None` once every entry has been seen.
    /// `None` also resets the cursor so the sequence restarts from the
    /// first entry. No snapshot isolation from concurrent create/remove.
    pub fn next_name(&mut self) -> Option<String> {
        if self.cursor >= self.live_count() {
            self.cursor = 0;
            return None;
        }
        let name = String::from_utf8_lossy(self.entries[self.cursor].name()).into_owned();
        self.cursor += 1;
        Some(name)
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Hydrates the table from its dedicated block. The cursor starts at 0.
    pub fn load<D: BlockDevice>(device: &D) -> Result<Self> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        device.read_block(DIRECTORY_ID, &mut buf)?;
        let mut entries = [DirEntry::EMPTY; NUM_INODES];
        for (i, entry) in entries.iter_mut().enumerate() {
            *entry = DirEntry::decode(&buf[i * DIR_ENTRY_SIZE..(i + 1) * DIR_ENTRY_SIZE]);
        }
        Ok(Self { entries, cursor: 0 })
    }

    /// Rewrites the whole directory block.
    pub fn store<D: BlockDevice>(&self, device: &D) -> Result<()> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        for (i, entry) in self.entries.iter().enumerate() {
            entry.encode(&mut buf[i * DIR_ENTRY_SIZE..(i + 1) * DIR_ENTRY_SIZE]);
        }
        device.write_block(DIRECTORY_ID, &buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup_is_exact() {
        let mut dir = DirectoryTable::new();
        dir.insert("Red", 1).unwrap();
        assert_eq!(dir.lookup("Red").unwrap(), 1);
        assert!(matches!(dir.lookup("red"), Err(FsError::NotFound)));
        assert!(matches!(dir.insert("Red", 2), Err(FsError::AlreadyExists)));
    }

    #[test]
    fn compaction_preserves_order() {
        let mut dir = DirectoryTable::new();
        dir.insert("a", 1).unwrap();
        dir.insert("b", 2).unwrap();
        dir.insert("c", 3).unwrap();
        dir.remove("b").unwrap();
        assert_eq!(dir.live_count(), 2);
        assert_eq!(dir.next_name().unwrap(), "a");
        assert_eq!(dir.next_name().unwrap(), "c");
        assert_eq!(dir.next_name(), None);
    }

    #[test]
    fn enumeration_restarts_after_end() {
        let mut dir = DirectoryTable::new();
        dir.insert("a", 1).unwrap();
        dir.insert("b", 2).unwrap();
        assert_eq!(dir.next_name().unwrap(), "a");
        assert_eq!(dir.next_name().unwrap(), "b");
        assert_eq!(dir.next_name(), None);
        assert_eq!(dir.next_name().unwrap(), "a");
    }

    #[test]
    fn cursor_survives_removal_behind_it() {
        let mut dir = DirectoryTable::new();
        dir.insert("a", 1).unwrap();
        dir.insert("b", 2).unwrap();
        assert_eq!(dir.next_name().unwrap(), "a");
        dir.remove("a").unwrap();
        dir.remove("b").unwrap();
        // Cursor is now past the live count; the next call ends and resets.
        assert_eq!(dir.next_name(), None);
        assert_eq!(dir.next_name(), None);
    }
}

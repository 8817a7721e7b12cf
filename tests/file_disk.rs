#![allow(unused)]

//! File-backed block device realizing the createFresh/openExisting
//! contract, plus the mount-time behavior that depends on it.

mod common;

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use quark::BlockDevice;
use quark::Error;
use quark::FileSystem;
use quark::Result;
use quark::BLOCK_SIZE;
use quark::INODE_SIZE;
use quark::INODE_TABLE_ID;
use quark::MAX_FSIZE;
use quark::SUPERBLOCK_ID;

pub struct FileDisk {
    inner: Mutex<std::fs::File>,
    num_blocks: usize,
}

impl FileDisk {
    /// Creates a zero-filled backing file. Fails if one already exists.
    pub fn create_fresh(path: &Path, num_blocks: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(Error::Io)?;
        file.set_len((num_blocks * BLOCK_SIZE) as u64)
            .map_err(Error::Io)?;
        Ok(FileDisk {
            inner: Mutex::new(file),
            num_blocks,
        })
    }

    /// Opens an existing backing file. Fails if it is absent or its size
    /// does not match the expected geometry.
    pub fn open_existing(path: &Path, num_blocks: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(Error::Io)?;
        let len = file.metadata().map_err(Error::Io)?.len();
        if len != (num_blocks * BLOCK_SIZE) as u64 {
            return Err(Error::CorruptVolume);
        }
        Ok(FileDisk {
            inner: Mutex::new(file),
            num_blocks,
        })
    }
}

impl BlockDevice for FileDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(Error::InvalidBlockId);
        }
        if buf.len() != BLOCK_SIZE {
            return Err(Error::InvalidBufferLength);
        }
        let mut inner = self.inner.lock().unwrap();
        inner.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))?;
        inner.read_exact(buf)?;
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(Error::InvalidBlockId);
        }
        if buf.len() != BLOCK_SIZE {
            return Err(Error::InvalidBufferLength);
        }
        let mut inner = self.inner.lock().unwrap();
        inner.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))?;
        inner.write_all(buf)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.inner.lock().unwrap().flush()?;
        Ok(())
    }
}

const DISK_BLOCKS: usize = 32;

#[test]
fn create_fresh_refuses_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("volume.img");
    FileDisk::create_fresh(&path, DISK_BLOCKS).unwrap();
    assert!(FileDisk::create_fresh(&path, DISK_BLOCKS).is_err());
}

#[test]
fn open_existing_checks_presence_and_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("volume.img");
    assert!(FileDisk::open_existing(&path, DISK_BLOCKS).is_err());

    FileDisk::create_fresh(&path, DISK_BLOCKS).unwrap();
    assert!(FileDisk::open_existing(&path, DISK_BLOCKS).is_ok());
    assert!(FileDisk::open_existing(&path, DISK_BLOCKS + 1).is_err());
}

#[test]
fn mount_hydrates_metadata_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("volume.img");

    let payload: Vec<u8> = (0..BLOCK_SIZE + 100).map(|i| (i % 250) as u8).collect();
    {
        let disk = FileDisk::create_fresh(&path, DISK_BLOCKS).unwrap();
        let mut fs = FileSystem::format(Arc::new(disk)).unwrap();
        let h = fs.open("kept.bin").unwrap();
        fs.write(h, &payload).unwrap();
        fs.create("other").unwrap();
        fs.device().flush().unwrap();
    }

    // A second mount sees the bitmap, inodes, and directory written by the
    // first, not empty in-memory state.
    let disk = FileDisk::open_existing(&path, DISK_BLOCKS).unwrap();
    let mut fs = FileSystem::mount(Arc::new(disk)).unwrap();

    log!("remounted volume, {} free blocks", fs.free_blocks());
    assert_eq!(fs.size("kept.bin").unwrap(), payload.len());
    assert_eq!(fs.list_next().unwrap(), "kept.bin");
    assert_eq!(fs.list_next().unwrap(), "other");
    assert_eq!(fs.list_next(), None);

    let h = fs.open("kept.bin").unwrap();
    assert_eq!(fs.read(h, payload.len()).unwrap(), payload);

    // The hydrated bitmap keeps the old file's blocks allocated: new data
    // must not land on them.
    let before = fs.free_blocks();
    let h2 = fs.open("new.bin").unwrap();
    fs.write(h2, &vec![0xAB; BLOCK_SIZE]).unwrap();
    assert_eq!(fs.free_blocks(), before - 1);
    fs.seek_read(h, 0).unwrap();
    assert_eq!(fs.read(h, payload.len()).unwrap(), payload);
}

#[test]
fn mount_rejects_bad_magic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("volume.img");

    {
        let disk = FileDisk::create_fresh(&path, DISK_BLOCKS).unwrap();
        FileSystem::format(Arc::new(disk)).unwrap();
    }

    // Clobber the superblock.
    let disk = FileDisk::open_existing(&path, DISK_BLOCKS).unwrap();
    disk.write_block(SUPERBLOCK_ID, &vec![0xFF; BLOCK_SIZE]).unwrap();

    assert!(matches!(
        FileSystem::mount(Arc::new(disk)),
        Err(Error::CorruptVolume)
    ));
}

#[test]
fn read_surfaces_corrupt_inode_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("volume.img");

    {
        let disk = FileDisk::create_fresh(&path, DISK_BLOCKS).unwrap();
        let mut fs = FileSystem::format(Arc::new(disk)).unwrap();
        let h = fs.open("full").unwrap();
        fs.write(h, &vec![7u8; MAX_FSIZE]).unwrap();
    }

    // Inflate the stored size of inode 1 past the direct-slot capacity.
    let disk = FileDisk::open_existing(&path, DISK_BLOCKS).unwrap();
    let mut block = vec![0u8; BLOCK_SIZE];
    disk.read_block(INODE_TABLE_ID, &mut block).unwrap();
    let bogus = (MAX_FSIZE + BLOCK_SIZE) as u32;
    block[INODE_SIZE + 4..INODE_SIZE + 8].copy_from_slice(&bogus.to_le_bytes());
    disk.write_block(INODE_TABLE_ID, &block).unwrap();

    // Reading past the mapped slots must report the inconsistency, not
    // panic on the block-reference array.
    let mut fs = FileSystem::mount(Arc::new(disk)).unwrap();
    let h = fs.open("full").unwrap();
    fs.seek_read(h, 0).unwrap();
    assert!(matches!(
        fs.read(h, MAX_FSIZE + BLOCK_SIZE),
        Err(Error::CorruptVolume)
    ));
}

#[test]
fn mount_rejects_unformatted_volume() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.img");
    let disk = FileDisk::create_fresh(&path, DISK_BLOCKS).unwrap();
    assert!(matches!(
        FileSystem::mount(Arc::new(disk)),
        Err(Error::CorruptVolume)
    ));
}

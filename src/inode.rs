//! The fixed-capacity inode table, persisted wholesale in its dedicated block.

use crate::config::*;
use crate::error::{FsError, Result};
use crate::structs::Inode;
use crate::BlockDevice;

#[derive(Debug, Clone)]
pub struct InodeTable {
    inodes: [Inode; NUM_INODES],
}

impl InodeTable {
    /// A fresh table: every inode free except inode 0, which permanently
    /// holds the directory table's own metadata.
    pub fn new() -> Self {
        let mut inodes = [Inode::FREE; NUM_INODES];
        inodes[ROOT_INODE_ID as usize] = Inode {
            in_use: true,
            size: BLOCK_SIZE as u32,
            indirect: None,
            direct: {
                let mut direct = [None; NUM_DIRECT_PTRS];
                direct[0] = Some(DIRECTORY_ID as u32);
                direct
            },
        };
        Self { inodes }
    }

    pub fn get(&self, inode_id: u32) -> Result<&Inode> {
        self.inodes
            .get(inode_id as usize)
            .ok_or(FsError::NotFound)
    }

    pub fn get_mut(&mut self, inode_id: u32) -> Result<&mut Inode> {
        self.inodes
            .get_mut(inode_id as usize)
            .ok_or(FsError::NotFound)
    }

    /// Lowest free index greater than 0. The new inode is zero-initialized
    /// and marked in use.
    pub fn allocate(&mut self) -> Result<u32> {
        for (id, inode) in self.inodes.iter_mut().enumerate().skip(1) {
            if !inode.in_use {
                *inode = Inode::FREE;
                inode.in_use = true;
                return Ok(id as u32);
            }
        }
        Err(FsError::TableFull)
    }

    /// Resets the inode to free: size zeroed, all block references cleared.
    pub fn free(&mut self, inode_id: u32) -> Result<()> {
        let inode = self.get_mut(inode_id)?;
        *inode = Inode::FREE;
        Ok(())
    }

    /// Hydrates the table from its dedicated block.
    pub fn load<D: BlockDevice>(device: &D) -> Result<Self> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        device.read_block(INODE_TABLE_ID, &mut buf)?;
        let mut inodes = [Inode::FREE; NUM_INODES];
        for (i, inode) in inodes.iter_mut().enumerate() {
            *inode = Inode::decode(&buf[i * INODE_SIZE..(i + 1) * INODE_SIZE]);
        }
        Ok(Self { inodes })
    }

    /// Rewrites the whole inode-table block.
    pub fn store<D: BlockDevice>(&self, device: &D) -> Result<()> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        for (i, inode) in self.inodes.iter().enumerate() {
            inode.encode(&mut buf[i * INODE_SIZE..(i + 1) * INODE_SIZE]);
        }
        device.write_block(INODE_TABLE_ID, &buf)?;
        Ok(())
    }
}

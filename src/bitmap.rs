//! Free-block tracking: one bit per block, packed into the single block
//! the layout dedicates to the bitmap.
//!
//! A bit is set iff the block is reserved (blocks 0-3) or referenced by
//! some inode's direct slots. Allocation scans in ascending index order,
//! so block reuse after `remove` is deterministic.

use crate::config::*;
use crate::error::{FsError, Result};
use crate::BlockDevice;

#[derive(Debug, Clone)]
pub struct Bitmap {
    bits: Vec<u8>,
    num_blocks: usize,
}

impl Bitmap {
    /// A fresh bitmap with every block free.
    pub fn new(num_blocks: usize) -> Self {
        Self {
            bits: vec![0u8; num_blocks.div_ceil(8)],
            num_blocks,
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    pub fn is_used(&self, block_id: usize) -> bool {
        if block_id >= self.num_blocks {
            return false;
        }
        self.bits[block_id / 8] & (1 << (block_id % 8)) != 0
    }

    pub fn mark_used(&mut self, block_id: usize) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(FsError::InvalidBlockId);
        }
        self.bits[block_id / 8] |= 1 << (block_id % 8);
        Ok(())
    }

    pub fn mark_free(&mut self, block_id: usize) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(FsError::InvalidBlockId);
        }
        self.bits[block_id / 8] &= !(1 << (block_id % 8));
        Ok(())
    }

    /// First free block in ascending index order.
    pub fn find_first_free(&self) -> Result<usize> {
        for block_id in 0..self.num_blocks {
            if !self.is_used(block_id) {
                return Ok(block_id);
            }
        }
        Err(FsError::OutOfSpace)
    }

    pub fn count_free(&self) -> usize {
        (0..self.num_blocks).filter(|&id| !self.is_used(id)).count()
    }

    /// Hydrates the bitmap from its dedicated block.
    pub fn load<D: BlockDevice>(device: &D) -> Result<Self> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        device.read_block(BITMAP_ID, &mut buf)?;
        let num_blocks = device.num_blocks();
        let bits = buf[..num_blocks.div_ceil(8)].to_vec();
        Ok(Self { bits, num_blocks })
    }

    /// Rewrites the whole bitmap block.
    pub fn store<D: BlockDevice>(&self, device: &D) -> Result<()> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        buf[..self.bits.len()].copy_from_slice(&self.bits);
        device.write_block(BITMAP_ID, &buf)?;
        Ok(())
    }
}

//! Reading, validating, and writing the superblock in block 0.

use crate::config::*;
use crate::error::{FsError, Result};
use crate::structs::SuperBlock;
use crate::BlockDevice;

/// Reads block 0 and validates it against the compile-time geometry and the
/// device. Any mismatch means the volume was not formatted by this file
/// system (or not for this device) and mounting must stop.
pub fn read_superblock<D: BlockDevice>(device: &D) -> Result<SuperBlock> {
    let mut buf = vec![0u8; BLOCK_SIZE];
    device.read_block(SUPERBLOCK_ID, &mut buf)?;
    let superblock = SuperBlock::decode(&buf);

    if superblock.magic != MAGIC {
        return Err(FsError::CorruptVolume);
    }
    if superblock.block_size != BLOCK_SIZE as u32 {
        return Err(FsError::CorruptVolume);
    }
    if superblock.num_blocks as usize != device.num_blocks() {
        return Err(FsError::CorruptVolume);
    }
    if superblock.num_inodes as usize != NUM_INODES {
        return Err(FsError::CorruptVolume);
    }

    Ok(superblock)
}

pub fn write_superblock<D: BlockDevice>(device: &D, superblock: &SuperBlock) -> Result<()> {
    let mut buf = vec![0u8; BLOCK_SIZE];
    superblock.encode(&mut buf);
    device.write_block(SUPERBLOCK_ID, &buf)?;
    device.flush()?;
    Ok(())
}

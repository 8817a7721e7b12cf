pub const MAGIC: u32 = 0x5155_4152; // "QUAR" in ASCII

pub const BLOCK_SIZE: usize = 4096;

// Linear on-disk layout: four reserved metadata blocks, then data.
pub const SUPERBLOCK_ID: usize = 0;
pub const INODE_TABLE_ID: usize = 1;
pub const BITMAP_ID: usize = 2;
pub const DIRECTORY_ID: usize = 3;
pub const DATA_START: usize = 4;

/// One capacity shared by the inode, directory, and open-file tables.
pub const NUM_INODES: usize = 40;
pub const ROOT_INODE_ID: u32 = 0; // Holds the directory table's own metadata.

pub const NUM_DIRECT_PTRS: usize = 12;
pub const INODE_SIZE: usize = 64;
pub const MAX_FSIZE: usize = NUM_DIRECT_PTRS * BLOCK_SIZE;

pub const DIR_ENTRY_SIZE: usize = 64;
pub const MAX_FILE_NAME_LEN: usize = 56;

/// The bitmap carries one bit per block and must fit its single block.
pub const MAX_VOLUME_BLOCKS: usize = BLOCK_SIZE * 8;

use crate::error::FsError;

/// The raw storage collaborator the file system is layered on.
///
/// Implementations are host-specific and live outside this crate
/// (a RAM disk, a plain file, ...). Blocks are fixed-size; the core
/// always reads and writes whole blocks.
pub trait BlockDevice: Send + Sync {
    /// Returns the number of blocks in the block device.
    fn num_blocks(&self) -> usize;

    /// Reads one block. buf.len() must be equal to block_size().
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), FsError>;

    /// Writes one block. buf.len() must be equal to block_size().
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), FsError>;

    /// Flushes any buffered data to the underlying storage.
    fn flush(&self) -> Result<(), FsError>;

    /// Returns the size of each block in bytes.
    fn block_size(&self) -> usize {
        crate::config::BLOCK_SIZE
    }
}

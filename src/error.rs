use thiserror::Error;

/// Error taxonomy for every fallible operation in the crate.
///
/// Device failures surface as `Io`. Metadata blocks are rewritten wholesale
/// rather than transactionally, so an `Io` error partway through a
/// multi-block write can leave data blocks written without the matching
/// inode/bitmap update. Nothing is retried.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no such file or handle")]
    NotFound,

    #[error("file already exists")]
    AlreadyExists,

    #[error("file is already open")]
    AlreadyOpen,

    #[error("inode, directory, or handle table is full")]
    TableFull,

    #[error("invalid or closed file handle")]
    InvalidHandle,

    #[error("seek position beyond end of file")]
    OutOfRange,

    #[error("write would exceed direct-block capacity")]
    CapacityExceeded,

    #[error("superblock validation failed or metadata is inconsistent")]
    CorruptVolume,

    #[error("no free blocks left on the volume")]
    OutOfSpace,

    #[error("file name is empty, too long, or contains NUL")]
    NameTooLong,

    #[error("block id out of range for the device")]
    InvalidBlockId,

    #[error("buffer length does not match the block size")]
    InvalidBufferLength,
}

pub type Result<T> = core::result::Result<T, FsError>;

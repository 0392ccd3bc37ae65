// Licensed under the Apache-2.0 license

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EfuseError {
    /// Address outside the 256-byte fuse space or not word aligned
    #[error("address {addr:#x} is out of range or not word aligned")]
    BadAddress { addr: u32 },

    /// Caller buffer too small to hold the request
    #[error("caller buffer of {len} bytes cannot hold the request")]
    BufferFault { len: usize },

    #[error("write payload must be 8 bytes, got {0}")]
    SizeMismatch(usize),

    /// Margin read failed on both rows backing the word
    #[error("program verification failed for word {word} ({failed_rows} rows)")]
    VerifyFailed { word: u32, failed_rows: u32 },

    #[error("unsupported read mode {0}")]
    UnsupportedReadMode(u32),

    #[error("unsupported control request {0:#x}")]
    UnsupportedRequest(u32),

    #[error("hardware still busy after {polls} status polls")]
    Timeout { polls: u32 },

    #[error("fuse programming is disabled")]
    ProgrammingDisabled,

    #[error("clock unavailable: {0}")]
    Clock(String),

    #[error("cannot map register window at {addr:#x}: {source}")]
    Mapping {
        addr: u64,
        #[source]
        source: std::io::Error,
    },
}

pub type EfuseResult<T> = Result<T, EfuseError>;

impl EfuseError {
    /// errno reported to callers of the character device interface.
    pub fn errno(&self) -> i32 {
        match self {
            EfuseError::BadAddress { .. } | EfuseError::BufferFault { .. } => libc::EFAULT,
            EfuseError::SizeMismatch(_) | EfuseError::UnsupportedReadMode(_) => libc::EINVAL,
            EfuseError::VerifyFailed { .. } => libc::EIO,
            EfuseError::UnsupportedRequest(_) => libc::ENOTTY,
            EfuseError::Timeout { .. } => libc::ETIMEDOUT,
            EfuseError::ProgrammingDisabled => libc::EPERM,
            EfuseError::Clock(_) => libc::ENODEV,
            EfuseError::Mapping { .. } => libc::ENOMEM,
        }
    }
}

use thiserror::Error;

/// Request-level failures. The HTTP mapping lives in the server module so
/// the data layer stays transport-free.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not found")]
    NotFound,

    #[error("path escapes the media root")]
    PathTraversal,

    #[error("sync token is not a safe path component")]
    InvalidToken,

    #[error("no sync token presented")]
    Unauthorized,

    #[error("sync payload exceeds the configured limit")]
    PayloadTooLarge,

    #[error("no renderer for this file type and no static server configured")]
    Unsupported,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

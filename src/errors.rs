use std::sync::PoisonError;

use thiserror::Error;

use crate::network::NetworkError;
use crate::storage::StorageError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot acquire repository lock")]
    CannotAcquireLock,

    #[error("Cannot use '{url}' as toggle endpoint: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    #[error("Cannot start polling thread: {0}")]
    ThreadStartError(String),

    #[error(transparent)]
    NetworkError(#[from] NetworkError),

    #[error(transparent)]
    StorageError(#[from] StorageError),
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_value: PoisonError<T>) -> Self {
        Error::CannotAcquireLock
    }
}

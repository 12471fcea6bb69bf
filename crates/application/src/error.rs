use image_manager_domain::{DomainError, ImageId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("compression failed for image {id} at position {position}: {reason}")]
    Compression {
        position: usize,
        id: ImageId,
        reason: String,
    },
    #[error("archive error: {0}")]
    Archive(String),
    #[error("an upload batch is already in progress")]
    UploadInProgress,
}

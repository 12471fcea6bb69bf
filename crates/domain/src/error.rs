use thiserror::Error;

use crate::ImageId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("index {index} is out of range for a collection of {count} images")]
    OutOfRange { index: usize, count: usize },
    #[error("image {0} not found")]
    NotFound(ImageId),
    #[error("invalid permutation: {0}")]
    InvalidPermutation(String),
}

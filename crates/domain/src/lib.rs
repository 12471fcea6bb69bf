mod error;
mod image;
mod reorder;
mod store;

pub use error::DomainError;
pub use image::{detect_image_format, ImageFormat, ImageId, ImagePayload, ImageRecord};
pub use reorder::{moved_sequence, DragState, DropEvent, ReorderEngine};
pub use store::{reindex_after_removal, ImageStore, SortKey};

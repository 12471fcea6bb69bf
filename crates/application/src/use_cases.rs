use image_manager_domain::{DropEvent, ImageId, SortKey};

use crate::RawFile;

#[derive(Debug, Clone)]
pub struct UploadFilesCommand {
    pub files: Vec<RawFile>,
}

#[derive(Debug, Clone, Default)]
pub struct PollUploadCommand;

#[derive(Debug, Clone, Default)]
pub struct WaitForUploadCommand;

#[derive(Debug, Clone, Copy)]
pub struct DeleteImageCommand {
    pub index: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct SetRootImageCommand {
    pub image_id: ImageId,
}

#[derive(Debug, Clone, Copy)]
pub struct StartDragCommand {
    pub index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EndDragCommand;

#[derive(Debug, Clone, Copy)]
pub struct DropImageCommand {
    pub event: DropEvent,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SortImagesCommand {
    pub key: SortKey,
}

#[derive(Debug, Clone, Default)]
pub struct ListImagesCommand;

#[derive(Debug, Clone, Copy)]
pub struct ImageDataUrlQuery {
    pub index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressQuery;

#[derive(Debug, Clone, Default)]
pub struct ExportArchiveCommand {
    /// Overrides the configured archive file name.
    pub file_name: Option<String>,
}

mod error;
mod export;
mod notify;
mod ports;
mod service;
mod upload;
mod use_cases;

pub use error::ApplicationError;
pub use export::{ExportPipeline, ExportReport, ExportSettings};
pub use notify::{BatchCompleted, NotificationBus};
pub use ports::{
    ArchiveBuilder, ArchiveWriter, CompressedImage, CompressionSettings, DownloadSink,
    ImageCompressor, ImageDecoder, RawFile,
};
pub use service::{ImageManagerService, ImageSummary, ProgressSnapshot, ServiceSettings};
pub use upload::{DecodeFailure, UploadPipeline, UploadProgress};
pub use use_cases::{
    DeleteImageCommand, DropImageCommand, EndDragCommand, ExportArchiveCommand,
    ImageDataUrlQuery, ListImagesCommand, PollUploadCommand, ProgressQuery, SetRootImageCommand,
    SortImagesCommand, StartDragCommand, UploadFilesCommand, WaitForUploadCommand,
};

pub mod archive;
pub mod codec;
pub mod fs;
pub mod presenters;

pub use archive::ZipArchiveWriter;
pub use codec::{target_dimensions, ImageCrateCompressor, ImageCrateDecoder};
pub use fs::{FsDownloadSink, LoadedFiles, WalkdirFileLoader};
pub use presenters::{present_batch, present_export_report, present_image_row, present_progress};

mod loader;
mod sink;

pub use loader::{LoadedFiles, WalkdirFileLoader};
pub use sink::FsDownloadSink;

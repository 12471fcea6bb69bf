use std::fs;
use std::path::PathBuf;

use image_manager_application::{ApplicationError, DownloadSink};

/// Saves exported archives into a directory.
#[derive(Debug, Clone)]
pub struct FsDownloadSink {
    output_dir: PathBuf,
}

impl FsDownloadSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl DownloadSink for FsDownloadSink {
    fn save(&self, blob: &[u8], file_name: &str) -> Result<String, ApplicationError> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
            return Err(ApplicationError::InvalidInput(format!(
                "archive file name must be a plain file name, got {file_name:?}"
            )));
        }

        fs::create_dir_all(&self.output_dir)
            .map_err(|error| ApplicationError::Io(error.to_string()))?;
        let path = self.output_dir.join(file_name);
        fs::write(&path, blob).map_err(|error| ApplicationError::Io(error.to_string()))?;
        Ok(path.display().to_string())
    }
}

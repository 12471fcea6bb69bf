use image_manager_domain::{ImageFormat, ImagePayload};
use serde::Deserialize;

use crate::ApplicationError;

/// One file handed over by the file-selection side, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Turns raw file bytes into an image payload. Called from worker threads.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, file: RawFile) -> Result<ImagePayload, ApplicationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompressionSettings {
    pub format: ImageFormat,
    pub quality: u8,
    pub ratio_percent: u8,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            format: ImageFormat::Webp,
            quality: 100,
            ratio_percent: 100,
            max_width: None,
            max_height: None,
        }
    }
}

impl CompressionSettings {
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.quality == 0 || self.quality > 100 {
            return Err(ApplicationError::InvalidInput(format!(
                "quality must be within 1..=100, got {}",
                self.quality
            )));
        }
        if self.ratio_percent == 0 || self.ratio_percent > 100 {
            return Err(ApplicationError::InvalidInput(format!(
                "ratio must be within 1..=100 percent, got {}",
                self.ratio_percent
            )));
        }
        if self.max_width == Some(0) || self.max_height == Some(0) {
            return Err(ApplicationError::InvalidInput(
                "maximum dimensions must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

pub trait ImageCompressor {
    fn compress(
        &self,
        payload: &ImagePayload,
        settings: &CompressionSettings,
    ) -> Result<CompressedImage, ApplicationError>;
}

/// Starts a fresh archive whose entries all live under one folder.
pub trait ArchiveWriter {
    fn create_folder(&self, name: &str) -> Result<Box<dyn ArchiveBuilder>, ApplicationError>;
}

pub trait ArchiveBuilder {
    fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<(), ApplicationError>;

    fn finish(self: Box<Self>) -> Result<Vec<u8>, ApplicationError>;
}

/// Receives the finished archive under a fixed file name and reports where it went.
pub trait DownloadSink {
    fn save(&self, blob: &[u8], file_name: &str) -> Result<String, ApplicationError>;
}

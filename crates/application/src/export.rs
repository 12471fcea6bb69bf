use image_manager_domain::ImageStore;
use tracing::{debug, info, warn};

use crate::{
    ApplicationError, ArchiveWriter, CompressionSettings, DownloadSink, ImageCompressor,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub archive_folder: String,
    pub archive_file_name: String,
    pub compression: CompressionSettings,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            archive_folder: "compress".to_string(),
            archive_file_name: "export.zip".to_string(),
            compression: CompressionSettings::default(),
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.archive_file_name.trim().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "archive file name must not be empty".to_string(),
            ));
        }
        if self.archive_folder.contains(['/', '\\'])
            || self.archive_folder == "."
            || self.archive_folder == ".."
        {
            return Err(ApplicationError::InvalidInput(format!(
                "archive folder must be a single path segment, got {}",
                self.archive_folder
            )));
        }
        self.compression.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub file_name: String,
    pub location: String,
    pub entries: Vec<String>,
    pub archive_bytes: usize,
}

/// Compresses every image in position order and packages the results.
///
/// Images are compressed strictly one after another: each entry is added to
/// the archive before the next image is handed to the compressor, so entries
/// appear in ascending `order_index` and only one compressed payload is held
/// at a time. The archive holds exactly one entry per image, with no separate
/// entry for the folder. The first failure, whether from the compressor or
/// the archive, aborts the export and nothing is saved. The store is only read.
pub struct ExportPipeline {
    compressor: Box<dyn ImageCompressor>,
    archive: Box<dyn ArchiveWriter>,
    sink: Box<dyn DownloadSink>,
    settings: ExportSettings,
}

impl ExportPipeline {
    pub fn new(
        compressor: Box<dyn ImageCompressor>,
        archive: Box<dyn ArchiveWriter>,
        sink: Box<dyn DownloadSink>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            compressor,
            archive,
            sink,
            settings,
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn run(&self, store: &ImageStore) -> Result<ExportReport, ApplicationError> {
        self.run_with_file_name(store, &self.settings.archive_file_name)
    }

    pub fn run_with_file_name(
        &self,
        store: &ImageStore,
        file_name: &str,
    ) -> Result<ExportReport, ApplicationError> {
        self.settings.validate()?;
        if file_name.trim().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "archive file name must not be empty".to_string(),
            ));
        }

        info!(images = store.len(), file_name, "export started");
        let mut builder = self.archive.create_folder(&self.settings.archive_folder)?;
        let mut entries = Vec::with_capacity(store.len());

        for record in store.iter() {
            let compressed = self
                .compressor
                .compress(&record.payload, &self.settings.compression)
                .map_err(|error| {
                    warn!(position = record.order_index, id = %record.id, %error, "compression failed");
                    ApplicationError::Compression {
                        position: record.order_index,
                        id: record.id,
                        reason: error.to_string(),
                    }
                })?;

            let entry_name = format!("{}.{}", record.order_index, compressed.format.extension());
            builder.add_file(&entry_name, &compressed.bytes)?;
            debug!(entry = %entry_name, bytes = compressed.bytes.len(), "archive entry added");
            entries.push(entry_name);
        }

        let blob = builder.finish()?;
        let location = self.sink.save(&blob, file_name)?;
        info!(entries = entries.len(), bytes = blob.len(), %location, "export finished");

        Ok(ExportReport {
            file_name: file_name.to_string(),
            location,
            entries,
            archive_bytes: blob.len(),
        })
    }
}

use std::sync::Arc;

use image_manager_domain::{DomainError, DragState, ImageFormat, ImageId, ImageStore};
use tracing::{info, warn};

use crate::{
    ApplicationError, ArchiveWriter, BatchCompleted, DeleteImageCommand, DownloadSink,
    DropImageCommand, EndDragCommand, ExportArchiveCommand, ExportPipeline, ExportReport,
    ExportSettings, ImageCompressor, ImageDataUrlQuery, ImageDecoder, ListImagesCommand,
    NotificationBus, PollUploadCommand, ProgressQuery, SetRootImageCommand, SortImagesCommand,
    StartDragCommand, UploadFilesCommand, UploadPipeline, UploadProgress, WaitForUploadCommand,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub decode_workers: usize,
    pub export: ExportSettings,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            decode_workers: 4,
            export: ExportSettings::default(),
        }
    }
}

/// Read-only view of one image, without its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    pub id: ImageId,
    pub order_index: usize,
    pub file_name: String,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
    pub is_root: bool,
}

/// Counters a UI polls to draw upload progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub images_count: usize,
    pub uploaded_images: usize,
    pub files: usize,
    pub failed: usize,
    pub uploading: bool,
}

pub struct ImageManagerService {
    store: ImageStore,
    bus: NotificationBus,
    uploads: UploadPipeline,
    export: ExportPipeline,
    drag: DragState,
}

impl ImageManagerService {
    pub fn new(
        decoder: Box<dyn ImageDecoder>,
        compressor: Box<dyn ImageCompressor>,
        archive: Box<dyn ArchiveWriter>,
        sink: Box<dyn DownloadSink>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            store: ImageStore::new(),
            bus: NotificationBus::new(),
            uploads: UploadPipeline::new(Arc::from(decoder), settings.decode_workers),
            export: ExportPipeline::new(compressor, archive, sink, settings.export),
            drag: DragState::default(),
        }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Replaces any previous subscriber. Returns `true` if one was replaced.
    pub fn on_batch_complete<F>(&mut self, handler: F) -> bool
    where
        F: FnMut(&BatchCompleted) + 'static,
    {
        self.bus.on_batch_complete(handler)
    }

    pub fn upload_files(&mut self, command: UploadFilesCommand) -> Result<u64, ApplicationError> {
        self.uploads.begin(command.files, &mut self.bus)
    }

    pub fn poll_upload(
        &mut self,
        _command: PollUploadCommand,
    ) -> Result<UploadProgress, ApplicationError> {
        Ok(self.uploads.poll(&mut self.store, &mut self.bus))
    }

    pub fn wait_for_upload(
        &mut self,
        _command: WaitForUploadCommand,
    ) -> Result<UploadProgress, ApplicationError> {
        Ok(self.uploads.wait(&mut self.store, &mut self.bus))
    }

    pub fn delete_image(&mut self, command: DeleteImageCommand) -> Result<ImageId, ApplicationError> {
        let removed = self.store.remove(command.index)?;
        info!(index = command.index, id = %removed.id, "image deleted");
        Ok(removed.id)
    }

    pub fn set_root_image(&mut self, command: SetRootImageCommand) -> Result<(), ApplicationError> {
        self.store.set_root(command.image_id)?;
        info!(id = %command.image_id, "root image set");
        Ok(())
    }

    pub fn start_drag(&mut self, command: StartDragCommand) -> Result<(), ApplicationError> {
        if command.index >= self.store.len() {
            return Err(DomainError::OutOfRange {
                index: command.index,
                count: self.store.len(),
            }
            .into());
        }
        self.drag.start(command.index);
        Ok(())
    }

    pub fn end_drag(&mut self, _command: EndDragCommand) {
        self.drag.end();
    }

    pub fn dragged_index(&self) -> Option<usize> {
        self.drag.dragged_index()
    }

    pub fn drop_image(&mut self, command: DropImageCommand) -> Result<(), ApplicationError> {
        self.drag.drop(&mut self.store, command.event)?;
        info!(
            from = command.event.previous_index,
            to = command.event.current_index,
            "image moved"
        );
        Ok(())
    }

    pub fn sort_images(&mut self, command: SortImagesCommand) {
        self.store.sort_ascending(command.key);
    }

    pub fn list_images(&self, _command: ListImagesCommand) -> Vec<ImageSummary> {
        self.store
            .iter()
            .map(|record| ImageSummary {
                id: record.id,
                order_index: record.order_index,
                file_name: record.payload.file_name.clone(),
                format: record.payload.format,
                width: record.payload.width,
                height: record.payload.height,
                byte_len: record.payload.bytes.len(),
                is_root: record.is_root,
            })
            .collect()
    }

    pub fn image_data_url(&self, query: ImageDataUrlQuery) -> Result<String, ApplicationError> {
        Ok(self.store.data_url(query.index)?)
    }

    pub fn progress(&self, _query: ProgressQuery) -> ProgressSnapshot {
        let upload = self.uploads.progress();
        ProgressSnapshot {
            images_count: self.store.len(),
            uploaded_images: upload.uploaded_images,
            files: upload.files,
            failed: upload.failed,
            uploading: upload.in_flight,
        }
    }

    pub fn export_archive(
        &self,
        command: ExportArchiveCommand,
    ) -> Result<ExportReport, ApplicationError> {
        if self.uploads.progress().in_flight {
            warn!("exporting while an upload batch is still in flight");
        }
        match command.file_name {
            Some(file_name) => self.export.run_with_file_name(&self.store, &file_name),
            None => self.export.run(&self.store),
        }
    }
}

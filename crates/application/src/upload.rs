use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;

use image_manager_domain::{ImagePayload, ImageStore};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use crate::{ApplicationError, BatchCompleted, ImageDecoder, NotificationBus, RawFile};

/// A file of the batch that could not be turned into an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadProgress {
    pub files: usize,
    pub uploaded_images: usize,
    pub failed: usize,
    pub in_flight: bool,
}

impl UploadProgress {
    pub fn is_complete(&self) -> bool {
        !self.in_flight && self.uploaded_images + self.failed == self.files
    }
}

struct DecodeOutcome {
    file_name: String,
    result: Result<ImagePayload, ApplicationError>,
}

struct InFlightBatch {
    id: u64,
    failures: Vec<DecodeFailure>,
    results: mpsc::Receiver<DecodeOutcome>,
}

/// Decodes batches of files on worker threads and feeds the results into the
/// store from the caller's thread.
///
/// Decoding runs on a rayon pool of `workers` threads, built on the first
/// batch. A decoder that panics fails only the file it was decoding.
/// Workers never touch the store. Results travel over a channel and are
/// applied one at a time by [`UploadPipeline::poll`] or
/// [`UploadPipeline::wait`], so every `add` runs to completion before the next.
pub struct UploadPipeline {
    decoder: Arc<dyn ImageDecoder>,
    workers: usize,
    pool: Option<ThreadPool>,
    last_batch_id: u64,
    files: usize,
    uploaded_images: usize,
    failed: usize,
    batch: Option<InFlightBatch>,
}

impl UploadPipeline {
    pub fn new(decoder: Arc<dyn ImageDecoder>, workers: usize) -> Self {
        Self {
            decoder,
            workers: workers.max(1),
            pool: None,
            last_batch_id: 0,
            files: 0,
            uploaded_images: 0,
            failed: 0,
            batch: None,
        }
    }

    pub fn progress(&self) -> UploadProgress {
        UploadProgress {
            files: self.files,
            uploaded_images: self.uploaded_images,
            failed: self.failed,
            in_flight: self.batch.is_some(),
        }
    }

    /// Starts decoding `files` and returns the batch id.
    ///
    /// An empty batch completes on the spot.
    pub fn begin(
        &mut self,
        files: Vec<RawFile>,
        bus: &mut NotificationBus,
    ) -> Result<u64, ApplicationError> {
        if self.batch.is_some() {
            return Err(ApplicationError::UploadInProgress);
        }

        self.last_batch_id += 1;
        let batch_id = self.last_batch_id;
        self.files = files.len();
        self.uploaded_images = 0;
        self.failed = 0;
        info!(batch_id, files = self.files, "upload batch started");

        if files.is_empty() {
            self.complete(batch_id, Vec::new(), bus);
            return Ok(batch_id);
        }

        let decoder = Arc::clone(&self.decoder);
        let pool = match self.pool() {
            Ok(pool) => pool,
            Err(error) => {
                self.files = 0;
                return Err(error);
            }
        };

        let (result_tx, result_rx) = mpsc::channel::<DecodeOutcome>();
        for file in files {
            let results = result_tx.clone();
            let decoder = Arc::clone(&decoder);
            pool.spawn(move || {
                let outcome = decode_isolated(decoder.as_ref(), file);
                // The receiver is gone only when the pipeline was dropped.
                let _ = results.send(outcome);
            });
        }

        self.batch = Some(InFlightBatch {
            id: batch_id,
            failures: Vec::new(),
            results: result_rx,
        });
        Ok(batch_id)
    }

    fn pool(&mut self) -> Result<&ThreadPool, ApplicationError> {
        let pool = match self.pool.take() {
            Some(pool) => pool,
            None => ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .thread_name(|index| format!("image-decode-{index}"))
                .build()
                .map_err(|error| {
                    ApplicationError::Io(format!("failed to start decode pool: {error}"))
                })?,
        };
        Ok(self.pool.insert(pool))
    }

    /// Applies every decode result that is ready, without blocking.
    pub fn poll(&mut self, store: &mut ImageStore, bus: &mut NotificationBus) -> UploadProgress {
        self.drain(store, bus, false)
    }

    /// Blocks until the current batch, if any, has fully resolved.
    pub fn wait(&mut self, store: &mut ImageStore, bus: &mut NotificationBus) -> UploadProgress {
        self.drain(store, bus, true)
    }

    fn drain(
        &mut self,
        store: &mut ImageStore,
        bus: &mut NotificationBus,
        block: bool,
    ) -> UploadProgress {
        let Some(mut batch) = self.batch.take() else {
            return self.progress();
        };

        while self.uploaded_images + self.failed < self.files {
            let next = if block {
                batch.results.recv().map_err(|_| mpsc::TryRecvError::Disconnected)
            } else {
                batch.results.try_recv()
            };

            match next {
                Ok(outcome) => self.apply(outcome, store, &mut batch.failures),
                Err(mpsc::TryRecvError::Empty) => {
                    self.batch = Some(batch);
                    return self.progress();
                }
                Err(mpsc::TryRecvError::Disconnected) => {
                    let missing = self.files - self.uploaded_images - self.failed;
                    warn!(
                        batch_id = batch.id,
                        missing, "decode pool stopped before finishing the batch"
                    );
                    self.failed += missing;
                    batch.failures.push(DecodeFailure {
                        file_name: format!("{missing} unresolved file(s)"),
                        reason: "decode pool stopped unexpectedly".to_string(),
                    });
                }
            }
        }

        self.complete(batch.id, batch.failures, bus);
        self.progress()
    }

    fn apply(
        &mut self,
        outcome: DecodeOutcome,
        store: &mut ImageStore,
        failures: &mut Vec<DecodeFailure>,
    ) {
        match outcome.result {
            Ok(payload) => {
                let id = store.add(payload);
                self.uploaded_images += 1;
                debug!(file = %outcome.file_name, %id, "image added");
            }
            Err(error) => {
                self.failed += 1;
                warn!(file = %outcome.file_name, %error, "skipping file that failed to decode");
                failures.push(DecodeFailure {
                    file_name: outcome.file_name,
                    reason: error.to_string(),
                });
            }
        }
    }

    fn complete(&mut self, batch_id: u64, failures: Vec<DecodeFailure>, bus: &mut NotificationBus) {
        info!(
            batch_id,
            files = self.files,
            uploaded = self.uploaded_images,
            failed = self.failed,
            "upload batch complete"
        );
        let event = BatchCompleted {
            batch_id,
            files: self.files,
            uploaded_images: self.uploaded_images,
            failures,
        };
        if !bus.publish(&event) {
            debug!(batch_id, "no subscriber for batch completion");
        }
    }
}

fn decode_isolated(decoder: &dyn ImageDecoder, file: RawFile) -> DecodeOutcome {
    let file_name = file.name.clone();
    let result = panic::catch_unwind(AssertUnwindSafe(|| decoder.decode(file)))
        .unwrap_or_else(|payload| {
            Err(ApplicationError::Decode(format!(
                "decoder panicked on {file_name}: {}",
                panic_message(payload.as_ref())
            )))
        });
    DecodeOutcome { file_name, result }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

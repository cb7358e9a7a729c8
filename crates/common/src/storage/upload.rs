//! Sequential multi-file upload queue.
//!
//! Files are uploaded one at a time: a file fully completes (or fails, or is
//! cancelled) before the next begins. Per-file progress is delivered over a
//! flume channel; cancellation is per-file through the token attached to each
//! request, and cancelling one file never affects the others. A single file's
//! failure is recorded in its outcome and the batch continues.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use super::provider::{StorageError, StorageProvider};

/// One file queued for upload. The caller keeps a clone of `cancel` to be
/// able to abort this file independently of the rest of the batch.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub name: String,
    pub bytes: Bytes,
    pub cancel: CancellationToken,
}

impl UploadRequest {
    pub fn new(name: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            bytes,
            cancel: CancellationToken::new(),
        }
    }
}

/// Progress and terminal events emitted while a batch drains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Progress { name: String, percent: u8 },
    Completed { name: String, item_id: String },
    Failed { name: String, error: String },
    Cancelled { name: String },
}

/// Terminal status of one file in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Completed { item_id: String },
    Failed { error: String },
    Cancelled,
}

/// Outcome for one file, under the name it was actually stored as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub name: String,
    pub status: UploadStatus,
}

/// Upload queue handle. Cheap to clone; events from every batch run through
/// the receiver returned by [`Uploader::new`].
#[derive(Debug, Clone)]
pub struct Uploader<S: StorageProvider> {
    storage: S,
    events: flume::Sender<UploadEvent>,
}

/// Pick a destination name that does not collide with `taken`, suffixing
/// ` (n)` before the extension until one is free.
fn unique_name(original: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(original) {
        return original.to_string();
    }
    let (base, ext) = match original.rfind('.') {
        Some(idx) if idx > 0 => (&original[..idx], &original[idx..]),
        _ => (original, ""),
    };
    let mut counter = 1;
    loop {
        let candidate = format!("{} ({}){}", base, counter, ext);
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

impl<S: StorageProvider> Uploader<S> {
    /// Create an uploader and the receiver its events drain through.
    pub fn new(storage: S) -> (Self, flume::Receiver<UploadEvent>) {
        let (tx, rx) = flume::unbounded();
        (
            Self {
                storage,
                events: tx,
            },
            rx,
        )
    }

    fn emit(&self, event: UploadEvent) {
        // Receiver may have been dropped; progress is best-effort.
        let _ = self.events.send(event);
    }

    /// Upload a batch of files into `container_id`, strictly in order.
    ///
    /// The destination's existing child names are fetched once up front;
    /// names assigned within the batch also count against later files.
    pub async fn upload_batch(
        &self,
        container_id: &str,
        requests: Vec<UploadRequest>,
    ) -> Result<Vec<UploadOutcome>, StorageError<S::Error>> {
        let mut taken: HashSet<String> = self
            .storage
            .list_children(container_id)
            .await?
            .into_iter()
            .map(|item| item.name)
            .collect();

        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            let name = unique_name(&request.name, &taken);
            taken.insert(name.clone());

            if request.cancel.is_cancelled() {
                self.emit(UploadEvent::Cancelled { name: name.clone() });
                outcomes.push(UploadOutcome {
                    name,
                    status: UploadStatus::Cancelled,
                });
                continue;
            }

            let events = self.events.clone();
            let progress_name = name.clone();
            let progress = Arc::new(move |percent: u8| {
                let _ = events.send(UploadEvent::Progress {
                    name: progress_name.clone(),
                    percent,
                });
            });

            let status = match self
                .storage
                .upload_item(
                    container_id,
                    &name,
                    request.bytes.clone(),
                    progress,
                    request.cancel.clone(),
                )
                .await
            {
                Ok(item_id) => {
                    self.emit(UploadEvent::Completed {
                        name: name.clone(),
                        item_id: item_id.clone(),
                    });
                    UploadStatus::Completed { item_id }
                }
                Err(StorageError::Cancelled(_)) => {
                    self.emit(UploadEvent::Cancelled { name: name.clone() });
                    UploadStatus::Cancelled
                }
                Err(err) => {
                    let error = err.to_string();
                    tracing::warn!("upload of {} failed: {}", name, error);
                    self.emit(UploadEvent::Failed {
                        name: name.clone(),
                        error: error.clone(),
                    });
                    UploadStatus::Failed { error }
                }
            };
            outcomes.push(UploadOutcome { name, status });
        }
        Ok(outcomes)
    }
}

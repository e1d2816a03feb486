//! Client-side upload tracking.
//!
//! [`UploadTracker`] streams files to an upload endpoint as multipart forms and
//! keeps one [`UploadRecord`] per upload until it is explicitly cleared. The
//! record set is published as an immutable snapshot: every update swaps in a
//! new `Arc`, so readers never observe a half-applied change.

mod record;

pub use record::{FileId, UploadFile, UploadRecord, UploadStatus};

use std::sync::Arc;

use bytes::Bytes;
use futures::{StreamExt, future::try_join_all, stream};
use parking_lot::RwLock;
use reqwest::{
    Body, Client,
    multipart::{Form, Part},
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Multipart field carrying the file payload.
pub const FILE_FIELD: &str = "file";

const CHUNK_SIZE: usize = 64 * 1024;

pub type UploadResult<T> = Result<T, UploadError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("network error during upload: {0}")]
    Network(String),
    #[error("upload failed with HTTP status {status}")]
    HttpStatus { status: u16 },
    #[error("failed to build upload request: {0}")]
    Request(String),
    #[error("invalid upload response: {0}")]
    Parse(String),
    #[error("{0}")]
    Io(String),
    #[error("upload task aborted: {0}")]
    Task(String),
}

type ProgressHook = Box<dyn Fn(FileId, u8) + Send + Sync>;
type CompleteHook = Box<dyn Fn(FileId, &str) + Send + Sync>;
type ErrorHook = Box<dyn Fn(FileId, &UploadError) + Send + Sync>;

/// Callbacks fixed for the lifetime of a tracker.
#[derive(Default)]
pub struct UploadHooks {
    on_progress: Option<ProgressHook>,
    on_complete: Option<CompleteHook>,
    on_error: Option<ErrorHook>,
}

impl UploadHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_progress(mut self, hook: impl Fn(FileId, u8) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(hook));
        self
    }

    pub fn on_complete(mut self, hook: impl Fn(FileId, &str) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn on_error(
        mut self,
        hook: impl Fn(FileId, &UploadError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }
}

#[derive(Clone)]
pub struct UploadTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    http: Client,
    upload_url: String,
    hooks: UploadHooks,
    records: RwLock<Arc<Vec<UploadRecord>>>,
}

impl UploadTracker {
    pub fn new(http: Client, upload_url: impl Into<String>, hooks: UploadHooks) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                http,
                upload_url: upload_url.into(),
                hooks,
                records: RwLock::new(Arc::new(Vec::new())),
            }),
        }
    }

    pub fn upload_url(&self) -> &str {
        &self.inner.upload_url
    }

    /// Upload one file and resolve with the URL reported by the endpoint.
    ///
    /// `destination` replaces the configured upload URL for this call only.
    pub async fn upload_file(
        &self,
        file: UploadFile,
        destination: Option<&str>,
    ) -> UploadResult<String> {
        let file_id = FileId::new();
        let target = destination.unwrap_or(&self.inner.upload_url).to_string();

        self.update(|records| records.push(UploadRecord::started(file_id, &file.file_name)));
        info!(
            %file_id,
            file_name = %file.file_name,
            %target,
            status = UploadStatus::Uploading.as_str(),
            "upload started"
        );

        match self.transfer(file_id, file, &target).await {
            Ok(url) => {
                self.mutate_record(file_id, |record| {
                    record.status = UploadStatus::Completed;
                    record.progress = 100;
                });
                info!(
                    %file_id,
                    %url,
                    status = UploadStatus::Completed.as_str(),
                    "upload completed"
                );
                if let Some(hook) = &self.inner.hooks.on_complete {
                    hook(file_id, &url);
                }
                Ok(url)
            }
            Err(err) => {
                let message = err.to_string();
                self.mutate_record(file_id, |record| {
                    record.status = UploadStatus::Error;
                    record.progress = 0;
                    record.error = Some(message);
                });
                warn!(
                    %file_id,
                    error = %err,
                    status = UploadStatus::Error.as_str(),
                    "upload failed"
                );
                if let Some(hook) = &self.inner.hooks.on_error {
                    hook(file_id, &err);
                }
                Err(err)
            }
        }
    }

    /// Upload every file concurrently, resolving with URLs in input order.
    ///
    /// The first failure fails the whole call. Each upload runs on its own task,
    /// so the remaining uploads keep going and settle their records regardless.
    pub async fn upload_multiple_files(&self, files: Vec<UploadFile>) -> UploadResult<Vec<String>> {
        let handles = files.into_iter().map(|file| {
            let tracker = self.clone();
            tokio::spawn(async move { tracker.upload_file(file, None).await })
        });

        try_join_all(handles.map(|handle| async move {
            handle
                .await
                .map_err(|err| UploadError::Task(err.to_string()))?
        }))
        .await
    }

    pub fn get_upload_progress(&self, file_id: FileId) -> Option<UploadRecord> {
        self.inner
            .records
            .read()
            .iter()
            .find(|record| record.file_id == file_id)
            .cloned()
    }

    /// Snapshot of every tracked upload in start order.
    pub fn uploads(&self) -> Arc<Vec<UploadRecord>> {
        self.inner.records.read().clone()
    }

    pub fn is_uploading(&self) -> bool {
        self.inner
            .records
            .read()
            .iter()
            .any(|record| record.status == UploadStatus::Uploading)
    }

    /// Returns whether a record was removed.
    pub fn clear_upload(&self, file_id: FileId) -> bool {
        let mut removed = false;
        self.update(|records| {
            let before = records.len();
            records.retain(|record| record.file_id != file_id);
            removed = records.len() != before;
        });
        removed
    }

    pub fn clear_all_uploads(&self) {
        *self.inner.records.write() = Arc::new(Vec::new());
    }

    async fn transfer(
        &self,
        file_id: FileId,
        file: UploadFile,
        target: &str,
    ) -> UploadResult<String> {
        let total = file.bytes.len() as u64;
        let part = file_part(
            Part::stream_with_length(self.progress_body(file_id, file.bytes), total),
            file.file_name,
            file.content_type.as_ref(),
        )?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .inner
            .http
            .post(target)
            .multipart(form)
            .send()
            .await
            .map_err(|err| UploadError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| UploadError::Network(err.to_string()))?;
        extract_url(&body)
    }

    /// Wraps the payload in a chunked stream that reports progress as each
    /// chunk is handed to the transport.
    fn progress_body(&self, file_id: FileId, bytes: Bytes) -> Body {
        let total = bytes.len();
        let chunks: Vec<Bytes> = (0..total)
            .step_by(CHUNK_SIZE)
            .map(|start| bytes.slice(start..(start + CHUNK_SIZE).min(total)))
            .collect();

        let tracker = self.clone();
        let mut sent = 0usize;
        let stream = stream::iter(chunks).map(move |chunk| {
            sent += chunk.len();
            tracker.report_progress(file_id, percent(sent, total));
            Ok::<_, std::io::Error>(chunk)
        });

        Body::wrap_stream(stream)
    }

    fn report_progress(&self, file_id: FileId, progress: u8) {
        let mut applied = false;
        self.mutate_record(file_id, |record| {
            if record.status == UploadStatus::Uploading && progress >= record.progress {
                record.progress = progress;
                applied = true;
            }
        });

        if applied {
            debug!(%file_id, progress, "upload progress");
            if let Some(hook) = &self.inner.hooks.on_progress {
                hook(file_id, progress);
            }
        }
    }

    fn mutate_record(&self, file_id: FileId, apply: impl FnOnce(&mut UploadRecord)) {
        self.update(|records| {
            if let Some(record) = records.iter_mut().find(|record| record.file_id == file_id) {
                apply(record);
            }
        });
    }

    /// Copy-on-write update: snapshots handed out earlier stay untouched.
    fn update(&self, apply: impl FnOnce(&mut Vec<UploadRecord>)) {
        let mut guard = self.inner.records.write();
        apply(Arc::make_mut(&mut *guard));
    }
}

fn file_part(part: Part, file_name: String, content_type: &str) -> UploadResult<Part> {
    part.file_name(file_name)
        .mime_str(content_type)
        .map_err(|err| UploadError::Request(err.to_string()))
}

fn percent(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((sent as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

/// Pulls the uploaded file URL from `url`, falling back to `data.url`.
fn extract_url(body: &str) -> UploadResult<String> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| UploadError::Parse(format!("response is not valid JSON: {err}")))?;

    value
        .get("url")
        .and_then(Value::as_str)
        .or_else(|| value.pointer("/data/url").and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| UploadError::Parse("response does not contain a file URL".to_string()))
}

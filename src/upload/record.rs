use std::{fmt, path::Path};

use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use super::{UploadError, UploadResult};

/// Opaque identifier allocated when an upload starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    Completed,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Uploading => "uploading",
            UploadStatus::Completed => "completed",
            UploadStatus::Error => "error",
        }
    }
}

/// State of a single tracked upload. `error` is only set when `status` is `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRecord {
    pub file_id: FileId,
    pub file_name: String,
    pub progress: u8,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadRecord {
    pub(crate) fn started(file_id: FileId, file_name: impl Into<String>) -> Self {
        Self {
            file_id,
            file_name: file_name.into(),
            progress: 0,
            status: UploadStatus::Uploading,
            error: None,
        }
    }
}

/// Binary payload handed to the tracker.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: mime::Mime,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: mime::Mime, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Read a local file, guessing the content type from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> UploadResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| UploadError::Io(format!("unable to derive filename from {path:?}")))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| UploadError::Io(format!("failed to read {}: {err}", path.display())))?;

        let content_type = content_type_for(path);
        Ok(Self::new(file_name, content_type, bytes))
    }
}

fn content_type_for(path: &Path) -> mime::Mime {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "svg" => mime::IMAGE_SVG,
        "pdf" => mime::APPLICATION_PDF,
        "json" => mime::APPLICATION_JSON,
        "txt" => mime::TEXT_PLAIN,
        "mp4" => "video/mp4".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        "webm" => "video/webm".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_content_types() {
        assert_eq!(content_type_for(Path::new("a/B.PNG")), mime::IMAGE_PNG);
        assert_eq!(content_type_for(Path::new("clip.mp4")).essence_str(), "video/mp4");
        assert_eq!(
            content_type_for(Path::new("archive")),
            mime::APPLICATION_OCTET_STREAM
        );
    }

    #[test]
    fn record_serializes_without_error_field_when_clean() {
        let record = UploadRecord::started(FileId::new(), "a.png");
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["status"], "uploading");
        assert_eq!(value["progress"], 0);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn status_labels_match_serialized_form() {
        for status in [
            UploadStatus::Uploading,
            UploadStatus::Completed,
            UploadStatus::Error,
        ] {
            let value = serde_json::to_value(status).expect("serialize");
            assert_eq!(value, status.as_str());
        }
    }

    #[tokio::test]
    async fn from_path_reads_bytes_and_name() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("cover.jpg");
        tokio::fs::write(&path, b"jpeg-bytes").await.expect("write");

        let file = UploadFile::from_path(&path).await.expect("load");
        assert_eq!(file.file_name, "cover.jpg");
        assert_eq!(file.content_type, mime::IMAGE_JPEG);
        assert_eq!(file.bytes.as_ref(), b"jpeg-bytes");
    }

    #[tokio::test]
    async fn from_path_reports_missing_file() {
        let err = UploadFile::from_path("/definitely/not/here.png")
            .await
            .expect_err("missing file");
        assert!(matches!(err, UploadError::Io(_)));
    }
}

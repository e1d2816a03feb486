use std::path::{Path, PathBuf};

use axum::{
    Json,
    extract::{Multipart, State, multipart::Field},
    http::StatusCode,
};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    upload::FILE_FIELD,
    web::{ApiMessage, AppState, UploadResponse, json_error},
};

/// Public path under which stored uploads are served.
pub const UPLOADS_PATH: &str = "/uploads";

/// Error returned when validating or persisting an uploaded file.
#[derive(Debug)]
pub struct StoreError {
    status: StatusCode,
    message: String,
}

impl StoreError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn too_large(limit: usize) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: format!("File exceeds the {limit} byte upload limit"),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

/// Metadata describing an upload written to disk.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub original_name: String,
    pub stored_name: String,
    pub stored_path: PathBuf,
    pub file_size: u64,
}

pub async fn receive_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, Json<ApiMessage>)> {
    let config = state.config();

    let stored = store_single_file(multipart, &config.upload_dir, config.upload_max_bytes)
        .await
        .map_err(|err| json_error(err.status, err.message))?;

    info!(
        original = %stored.original_name,
        stored = %stored.stored_name,
        path = %stored.stored_path.display(),
        bytes = stored.file_size,
        "stored upload"
    );

    let base = config.public_base_url.as_deref().unwrap_or("");
    Ok(Json(UploadResponse::new(format!(
        "{base}{UPLOADS_PATH}/{}",
        stored.stored_name
    ))))
}

/// Persists the `file` field of a multipart form under `dest_dir`. Other fields are ignored.
pub async fn store_single_file(
    mut multipart: Multipart,
    dest_dir: &Path,
    max_bytes: usize,
) -> Result<StoredFile, StoreError> {
    let mut stored: Option<StoredFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| StoreError::bad_request(format!("Failed to parse upload form: {err}")))?
    {
        if field.name() != Some(FILE_FIELD) || field.file_name().is_none() {
            continue;
        }

        if stored.is_some() {
            return Err(StoreError::bad_request("Only one file may be uploaded per request"));
        }

        stored = Some(write_field(field, dest_dir, max_bytes).await?);
    }

    stored.ok_or_else(|| StoreError::bad_request(format!("Missing `{FILE_FIELD}` field")))
}

async fn write_field(
    mut field: Field<'_>,
    dest_dir: &Path,
    max_bytes: usize,
) -> Result<StoredFile, StoreError> {
    let original_name = field.file_name().unwrap_or("upload.bin").to_string();
    let stored_name = stored_name_for(&original_name);
    let stored_path = dest_dir.join(&stored_name);

    let mut file = File::create(&stored_path).await.map_err(|err| {
        error!(?err, path = %stored_path.display(), "failed to create upload file");
        StoreError::internal("Failed to save file")
    })?;

    let mut total_bytes: u64 = 0;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(err) => {
                discard(&stored_path).await;
                return Err(StoreError::bad_request(format!("Failed to read upload data: {err}")));
            }
        };

        total_bytes += chunk.len() as u64;
        if total_bytes > max_bytes as u64 {
            discard(&stored_path).await;
            return Err(StoreError::too_large(max_bytes));
        }

        if let Err(err) = file.write_all(&chunk).await {
            error!(?err, path = %stored_path.display(), "failed to write upload chunk");
            discard(&stored_path).await;
            return Err(StoreError::internal("Failed to save file"));
        }
    }

    file.flush().await.map_err(|err| {
        error!(?err, "failed to flush upload file");
        StoreError::internal("Failed to save file")
    })?;

    if total_bytes == 0 {
        discard(&stored_path).await;
        return Err(StoreError::bad_request("Uploaded file is empty"));
    }

    Ok(StoredFile {
        original_name,
        stored_name,
        stored_path,
        file_size: total_bytes,
    })
}

/// Random stem, sanitized lowercase extension of the original name.
fn stored_name_for(original_name: &str) -> String {
    let sanitized = sanitize_filename::sanitize(original_name);
    let extension = Path::new(&sanitized)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(extension) => format!("{}.{extension}", Uuid::new_v4()),
        None => Uuid::new_v4().to_string(),
    }
}

async fn discard(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        error!(?err, path = %path.display(), "failed to remove partial upload");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_name_keeps_lowercase_extension() {
        let name = stored_name_for("Holiday Photo.PNG");
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 36 + 4);
    }

    #[test]
    fn stored_name_never_contains_path_segments() {
        let name = stored_name_for("../../etc/passwd");
        assert!(!name.contains('/'));
        assert!(!name.contains(".."));

        let name = stored_name_for("archive");
        assert_eq!(name.len(), 36);
    }
}

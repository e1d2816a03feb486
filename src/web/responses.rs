use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

/// Canonical JSON payload for error responses.
#[derive(Debug, Serialize, Clone)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{ success, message }` envelope returned by the auth proxy on local failures.
#[derive(Debug, Serialize, Clone)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
}

/// Body returned by the local upload endpoint. `data.url` mirrors `url`.
#[derive(Debug, Serialize, Clone)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub data: UploadData,
}

#[derive(Debug, Serialize, Clone)]
pub struct UploadData {
    pub url: String,
}

impl UploadResponse {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            success: true,
            data: UploadData { url: url.clone() },
            url,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy)]
pub struct LoadingStatus {
    pub loading: bool,
    pub pending: usize,
}

/// Helper for controllers that need to return `(StatusCode, Json<ApiMessage>)`.
pub fn json_error(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiMessage>) {
    (status, Json(ApiMessage::new(message)))
}

pub fn internal_error() -> (StatusCode, Json<ErrorEnvelope>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorEnvelope {
            success: false,
            message: "Internal server error".to_string(),
        }),
    )
}

pub mod config;
pub mod guard;
pub mod upload;
pub mod web;

pub use config::AppConfig;
pub use guard::{ACCESS_TOKEN_COOKIE, RouteDecision, classify};
pub use upload::{
    FileId, UploadError, UploadFile, UploadHooks, UploadRecord, UploadStatus, UploadTracker,
};
pub use web::{AppState, LoadingGate};

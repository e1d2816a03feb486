pub mod auth;
pub mod loading;
pub mod pages;
pub mod proxy;
pub mod responses;
pub mod router;
pub mod state;
pub mod templates;
pub mod uploads;

pub use loading::{LoadingGate, LoadingGuard};
pub use responses::{
    ApiMessage, ErrorEnvelope, LoadingStatus, UploadResponse, internal_error, json_error,
};
pub use state::AppState;
pub use templates::{escape_html, render_page};

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    routing::{any, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    guard,
    web::{AppState, LoadingStatus, auth, pages, proxy, uploads},
};

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config().upload_max_bytes.saturating_add(MULTIPART_OVERHEAD);
    let upload_dir = state.config().upload_dir.clone();

    Router::new()
        .route("/", get(pages::home))
        .route("/form", get(pages::login_form))
        .route("/boards", get(pages::boards))
        .route("/workspace", get(pages::workspace))
        .route("/chat", get(pages::chat))
        .route("/payment", get(pages::payment))
        .route("/healthz", get(healthz))
        .route("/favicon.ico", get(favicon))
        .route("/api/status", get(loading_status))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/upload",
            post(uploads::receive_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(&format!("{}/*path", proxy::PROXY_PREFIX), any(proxy::forward))
        .nest_service(uploads::UPLOADS_PATH, ServeDir::new(upload_dir))
        .layer(middleware::from_fn(guard::route_guard))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn loading_status(State(state): State<AppState>) -> Json<LoadingStatus> {
    let loading = state.loading();
    Json(LoadingStatus {
        loading: loading.is_loading(),
        pending: loading.pending(),
    })
}

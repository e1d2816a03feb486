use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::web::{AppState, json_error};

/// Local prefix whose requests are rewritten onto the backend host.
pub const PROXY_PREFIX: &str = "/api/backend";

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "host",
    "content-length",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Replays the request against `{backend}/{path}` and relays the answer unchanged.
pub async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let _loading = state.loading().enter();
    let url = upstream_url(&state.config().backend_url, &path, query.as_deref());
    debug!(%method, %url, "proxying request");

    let upstream = state
        .http()
        .request(method, &url)
        .headers(strip_hop_by_hop(&headers))
        .body(body)
        .send()
        .await;

    let response = match upstream {
        Ok(response) => response,
        Err(err) => {
            error!(?err, %url, "backend proxy request failed");
            return json_error(StatusCode::BAD_GATEWAY, "Backend is unavailable").into_response();
        }
    };

    let status = response.status();
    let response_headers = strip_hop_by_hop(response.headers());
    match response.bytes().await {
        Ok(bytes) => (status, response_headers, bytes).into_response(),
        Err(err) => {
            error!(?err, %url, "failed to read backend response");
            json_error(StatusCode::BAD_GATEWAY, "Backend response was interrupted").into_response()
        }
    }
}

fn upstream_url(backend: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!("{}/{}", backend.trim_end_matches('/'), path.trim_start_matches('/'));
    if let Some(query) = query.filter(|query| !query.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();
    for name in HOP_BY_HOP {
        forwarded.remove(*name);
    }
    forwarded
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header};

    use super::*;

    #[test]
    fn builds_upstream_url_with_query() {
        assert_eq!(
            upstream_url("http://api:4000/", "videos/1", Some("page=2")),
            "http://api:4000/videos/1?page=2"
        );
        assert_eq!(
            upstream_url("http://api:4000", "videos", Some("")),
            "http://api:4000/videos"
        );
    }

    #[test]
    fn strips_connection_level_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:8080"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer x"));

        let forwarded = strip_hop_by_hop(&headers);
        assert!(forwarded.get(header::HOST).is_none());
        assert!(forwarded.get(header::CONNECTION).is_none());
        assert_eq!(
            forwarded.get(header::AUTHORIZATION),
            Some(&HeaderValue::from_static("Bearer x"))
        );
    }
}

use anyhow::{Context, Result};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use serde_json::Value;
use tracing::{error, info};

use crate::{
    guard::{ACCESS_TOKEN_COOKIE, LOGIN_PATH},
    web::{AppState, ErrorEnvelope, internal_error},
};

pub const SESSION_TTL_DAYS: i64 = 7;

/// Forwards the login body to `{backend}/login` and relays the answer verbatim.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<Response, (StatusCode, Json<ErrorEnvelope>)> {
    let _loading = state.loading().enter();

    let (status, payload) = match forward_login(&state, body).await {
        Ok(relayed) => relayed,
        Err(err) => {
            error!(?err, "login proxy failed");
            return Err(internal_error());
        }
    };

    let jar = match access_token(&payload.json) {
        Some(token) if status.is_success() => {
            info!("login succeeded, issuing access token cookie");
            jar.add(session_cookie(token))
        }
        _ => jar,
    };

    Ok((
        status,
        jar,
        [(header::CONTENT_TYPE, "application/json")],
        payload.raw,
    )
        .into_response())
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let mut removal = Cookie::new(ACCESS_TOKEN_COOKIE, "");
    removal.set_path("/");
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(CookieDuration::seconds(0));

    (jar.remove(removal), Redirect::to(LOGIN_PATH))
}

struct UpstreamBody {
    raw: Bytes,
    json: Value,
}

async fn forward_login(state: &AppState, body: Bytes) -> Result<(StatusCode, UpstreamBody)> {
    serde_json::from_slice::<Value>(&body).context("login request body is not valid JSON")?;

    let url = format!("{}/login", state.config().backend_url);
    let response = state
        .http()
        .post(&url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .header(reqwest::header::ACCEPT, "application/json")
        .body(body)
        .send()
        .await
        .with_context(|| format!("login request to {url} failed"))?;

    let status = StatusCode::from_u16(response.status().as_u16())
        .context("upstream returned an invalid status code")?;
    let raw = response
        .bytes()
        .await
        .context("failed to read login response body")?;
    let json = serde_json::from_slice(&raw).context("login response body is not valid JSON")?;

    Ok((status, UpstreamBody { raw, json }))
}

/// Looks for a token at the top level or under `data`.
fn access_token(payload: &Value) -> Option<&str> {
    ["/accessToken", "/token", "/data/accessToken", "/data/token"]
        .iter()
        .find_map(|pointer| payload.pointer(pointer).and_then(Value::as_str))
        .filter(|token| !token.is_empty())
}

fn session_cookie(token: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(CookieDuration::days(SESSION_TTL_DAYS));
    cookie
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn access_token_checks_known_locations() {
        assert_eq!(access_token(&json!({ "accessToken": "a" })), Some("a"));
        assert_eq!(access_token(&json!({ "token": "b" })), Some("b"));
        assert_eq!(
            access_token(&json!({ "data": { "accessToken": "c" } })),
            Some("c")
        );
        assert_eq!(access_token(&json!({ "data": { "token": "" } })), None);
        assert_eq!(access_token(&json!({ "success": false })), None);
    }

    #[test]
    fn session_cookie_is_scoped_to_site_root() {
        let cookie = session_cookie("tok");
        assert_eq!(cookie.name(), ACCESS_TOKEN_COOKIE);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(SESSION_TTL_DAYS)));
    }
}

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

/// Cookie whose presence marks a request as authenticated.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

pub const LOGIN_PATH: &str = "/form";
pub const POST_LOGIN_PATH: &str = "/boards";

const PROTECTED_PREFIXES: &[&str] = &["/workspace", "/chat", "/payment", "/boards"];
const AUTH_PREFIXES: &[&str] = &[LOGIN_PATH];
const BYPASS_PREFIXES: &[&str] = &["/api/", "/static/", "/uploads/"];
const BYPASS_EXACT: &[&str] = &["/api", "/favicon.ico"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// Decides what to do with a page request. First matching rule wins.
pub fn classify(path: &str, is_authenticated: bool) -> RouteDecision {
    if !is_authenticated && matches_any(path, PROTECTED_PREFIXES) {
        return RouteDecision::Redirect(LOGIN_PATH);
    }

    if is_authenticated && matches_any(path, AUTH_PREFIXES) {
        return RouteDecision::Redirect(POST_LOGIN_PATH);
    }

    RouteDecision::Allow
}

/// API routes, static assets and the favicon never reach the classifier.
pub fn is_bypassed(path: &str) -> bool {
    BYPASS_EXACT.contains(&path) || BYPASS_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

pub fn is_authenticated(jar: &CookieJar) -> bool {
    jar.get(ACCESS_TOKEN_COOKIE)
        .is_some_and(|cookie| !cookie.value().is_empty())
}

fn matches_any(path: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix))
}

/// Middleware applying [`classify`] to every inbound request.
pub async fn route_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();

    if is_bypassed(&path) {
        return next.run(request).await;
    }

    match classify(&path, is_authenticated(&jar)) {
        RouteDecision::Allow => next.run(request).await,
        RouteDecision::Redirect(target) => {
            debug!(%path, redirect_to = target, "route guard redirect");
            Redirect::temporary(target).into_response()
        }
    }
}

//! CORS origin enforcement.
//!
//! The allowed-origin set is fixed at startup: the development frontend plus
//! an optional deployed frontend from configuration. The decision itself is a
//! pure function over that set so it can be tested without a server; the
//! axum middleware wraps it with the header side effects.

use crate::error::AppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use std::sync::Arc;

/// Origin used by the local development frontend (Vite dev server).
pub const DEV_ORIGIN: &str = "http://localhost:5173";

/// Methods advertised on preflight responses.
const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Outcome of an origin check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Immutable set of origins permitted to make credentialed requests.
///
/// Ordered, built once at startup, and shared across request handlers.
/// Membership is exact string equality; there is no wildcard or prefix
/// matching, so a configured `"*"` only ever matches a literal `Origin: *`.
#[derive(Debug, Clone)]
pub struct AllowedOrigins(Arc<Vec<String>>);

impl AllowedOrigins {
    /// Build a set from explicit origins, skipping blank entries.
    pub fn new(origins: Vec<String>) -> Self {
        let origins: Vec<String> = origins
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self(Arc::new(origins))
    }

    /// Build the production set: the fixed development origin plus the
    /// configured frontend origin, when one is set.
    pub fn from_config(frontend_url: Option<&str>) -> Self {
        let mut origins = vec![DEV_ORIGIN.to_string()];
        if let Some(frontend) = frontend_url {
            let frontend = frontend.trim();
            if !frontend.is_empty() && frontend != DEV_ORIGIN {
                origins.push(frontend.to_string());
            }
        }
        Self::new(origins)
    }

    /// Exact-match membership test
    pub fn contains(&self, origin: &str) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Decide whether a request with the given declared origin may proceed.
///
/// Requests without an `Origin` header (curl, server-to-server calls) are
/// allowed through: the policy is browser-oriented and must not block
/// non-browser clients. A present origin must be an exact member of the set.
pub fn evaluate(origin: Option<&str>, allowed: &AllowedOrigins) -> Decision {
    match origin {
        None => Decision::Allow,
        Some(origin) if allowed.contains(origin) => Decision::Allow,
        Some(_) => Decision::Deny,
    }
}

/// Middleware enforcing the origin policy before any route handler runs.
///
/// On deny the pipeline short-circuits with a structured 403; downstream
/// routers never see the request. On allow with a present origin, the
/// response is stamped with the credentialed CORS headers so the browser
/// accepts it. Preflight requests from allowed origins are answered here.
pub async fn enforce(
    State(allowed): State<AllowedOrigins>,
    req: Request,
    next: Next,
) -> Response {
    let origin = match req.headers().get(header::ORIGIN) {
        None => None,
        Some(value) => match value.to_str() {
            Ok(s) => Some(s.to_string()),
            Err(_) => {
                // Present but unreadable counts as a declared origin we
                // cannot match, not as an absent one.
                return AppError::OriginRejected("<invalid origin header>".to_string())
                    .into_response();
            }
        },
    };

    match evaluate(origin.as_deref(), &allowed) {
        Decision::Deny => {
            AppError::OriginRejected(origin.unwrap_or_default()).into_response()
        }
        Decision::Allow => match origin {
            None => next.run(req).await,
            Some(origin) => {
                if req.method() == Method::OPTIONS {
                    preflight_response(&req, &origin)
                } else {
                    let mut response = next.run(req).await;
                    apply_cors_headers(response.headers_mut(), &origin);
                    response
                }
            }
        },
    }
}

/// Answer a preflight request from an allowed origin.
fn preflight_response(req: &Request, origin: &str) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    apply_cors_headers(headers, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    // Echo whatever headers the browser asked to send.
    if let Some(requested) = req.headers().get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
    }
    response
}

/// Stamp the credentialed CORS headers for an allowed origin.
fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(header::VARY, HeaderValue::from_static("Origin"));
}

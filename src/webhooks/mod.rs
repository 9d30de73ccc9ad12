pub mod github;
pub mod pull_request;
pub mod review;

use axum::http::HeaderMap;

use crate::github::signature::SIGNATURE_HEADER;

/// Value of `name` when present and valid visible ASCII.
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// The signature header exactly as sent; it is compared byte for byte.
pub(crate) fn signature_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
}

//! Fully buffered HTTP response model.
//!
//! This is what a [`Transport`](crate::net::Transport) hands back for a
//! completed exchange: final URL, status code + reason, headers, and the
//! raw body bytes. No parsing or classification happens here; the outcome
//! decoder owns both.

use http::HeaderMap;
use url::Url;

#[derive(Debug, Clone)]
pub struct Response {
    /// Final URL of the response (after redirects, if any).
    pub url: Url,

    /// Numeric HTTP status code (e.g. `200`, `404`).
    pub status: u16,

    /// Reason phrase; may be empty for non-standard codes.
    pub status_text: String,

    /// Response headers, case-insensitive by name.
    pub headers: HeaderMap,

    /// Raw response body bytes.
    pub body: Vec<u8>,
}

pub mod fetch;
pub mod response;
#[cfg(test)]
pub(crate) mod testing;

pub use fetch::ReqwestTransport;
pub use response::Response;

use futures::future::BoxFuture;
use http::{HeaderMap, Method};
use std::fmt;
use url::Url;

/// A fully assembled request, ready to be put on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Encoded request body, if the verb carries one.
    pub body: Option<Vec<u8>>,
}

/// Broad classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The connection could not be established.
    Connect,
    /// The exchange did not complete within the configured timeout.
    Timeout,
    /// The request could not be assembled (bad URL, bad header).
    InvalidRequest,
    /// The exchange failed after the connection was up.
    Protocol,
    /// The exchange was abandoned before a result was delivered.
    Aborted,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Connect => write!(f, "connect"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::InvalidRequest => write!(f, "invalid request"),
            TransportErrorKind::Protocol => write!(f, "protocol"),
            TransportErrorKind::Aborted => write!(f, "aborted"),
        }
    }
}

/// A failure that occurred before any status line and body existed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    pub message: String,
    pub kind: TransportErrorKind,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

/// The seam between the reply engine and the actual HTTP stack.
///
/// Implementations deliver exactly one result per [`send`](Transport::send)
/// call. Status classification is not their concern; a non-2xx response is
/// still an `Ok` result here.
pub trait Transport: Send + Sync {
    fn send(&self, request: TransportRequest) -> BoxFuture<'static, Result<Response, TransportError>>;
}

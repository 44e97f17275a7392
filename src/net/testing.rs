//! Scripted transport for tests. Exchanges are staged per request path
//! (including the query string, if any) and served in FIFO order.

use crate::net::{Response, Transport, TransportError, TransportErrorKind, TransportRequest};
use futures::future::BoxFuture;
use futures::FutureExt;
use http::HeaderMap;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) struct MockExchange {
    status: u16,
    body: Vec<u8>,
    error: Option<TransportError>,
    delay: Option<Duration>,
}

impl MockExchange {
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            body: serde_json::to_vec(body).unwrap(),
            error: None,
            delay: None,
        }
    }

    pub fn raw(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            body: body.to_vec(),
            error: None,
            delay: None,
        }
    }

    pub fn error(error: TransportError) -> Self {
        Self {
            status: 0,
            body: Vec::new(),
            error: Some(error),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

pub(crate) struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<MockExchange>>>,
    hits: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
        })
    }

    /// Queue an exchange for the given path (e.g. `/posts/1` or `/posts?userId=42`).
    pub fn stage(&self, path: &str, exchange: MockExchange) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(exchange);
    }

    /// Number of requests that reached this transport.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'static, Result<Response, TransportError>> {
        self.hits.fetch_add(1, Ordering::SeqCst);

        let key = match request.url.query() {
            Some(query) => format!("{}?{}", request.url.path(), query),
            None => request.url.path().to_string(),
        };
        let staged = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front());
        let url = request.url;

        async move {
            let Some(exchange) = staged else {
                return Err(TransportError::new(
                    TransportErrorKind::Protocol,
                    format!("no staged exchange for {key}"),
                ));
            };

            if let Some(delay) = exchange.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(error) = exchange.error {
                return Err(error);
            }

            Ok(Response {
                url,
                status: exchange.status,
                status_text: String::new(),
                headers: HeaderMap::new(),
                body: exchange.body,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use url::Url;

    fn request(path: &str) -> TransportRequest {
        TransportRequest {
            method: Method::GET,
            url: Url::parse("http://localhost:3000")
                .unwrap()
                .join(path)
                .unwrap(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn staged_exchanges_are_served_in_order() {
        let transport = MockTransport::new();
        transport.stage("/posts", MockExchange::raw(200, b"[1]"));
        transport.stage("/posts", MockExchange::raw(200, b"[2]"));

        let first = transport.send(request("/posts")).await.unwrap();
        let second = transport.send(request("/posts")).await.unwrap();
        assert_eq!(first.body, b"[1]");
        assert_eq!(second.body, b"[2]");
        assert_eq!(transport.hits(), 2);
    }

    #[tokio::test]
    async fn unstaged_path_reports_a_transport_error() {
        let transport = MockTransport::new();
        let err = transport.send(request("/missing")).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Protocol);
    }
}

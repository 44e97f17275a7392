//! Resource-class facade: verb helpers and the request builder.
//!
//! A [`RestClass`] is a cheap clonable handle scoped to one resource path
//! below the client's base URL. Every verb helper declares the expected
//! reply shape through its type parameter and hands back a
//! [`Reply`](crate::reply::Reply) immediately; the exchange itself runs
//! on a spawned task.

use crate::client::ClientInner;
use crate::codec::{self, CodecError};
use crate::net::{TransportError, TransportErrorKind, TransportRequest};
use crate::paging::{Cursor, PagedReply};
use crate::reply::outcome::ExchangeResult;
use crate::reply::shape::{Paged, ReplyShape};
use crate::reply::Reply;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Clone)]
pub struct RestClass {
    inner: Arc<ClientInner>,
    /// Resource path relative to the base URL, without surrounding slashes.
    path: String,
}

impl RestClass {
    pub(crate) fn new(inner: Arc<ClientInner>, path: &str) -> Self {
        Self {
            inner,
            path: path.trim_matches('/').to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Scope a nested resource below this class.
    pub fn subclass(&self, path: &str) -> RestClass {
        let sub = path.trim_matches('/');
        let path = if self.path.is_empty() {
            sub.to_string()
        } else {
            format!("{}/{}", self.path, sub)
        };

        RestClass {
            inner: self.inner.clone(),
            path,
        }
    }

    /// Start a request against this class with an explicit verb.
    pub fn request(&self, method: Method) -> RequestBuilder {
        RequestBuilder {
            inner: self.inner.clone(),
            class_path: self.path.clone(),
            method,
            path: String::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// GET `path` below this class. An empty path addresses the class root.
    pub fn get<S: ReplyShape>(&self, path: &str) -> Reply<S> {
        self.request(Method::GET).path(path).send::<S>()
    }

    pub fn head<S: ReplyShape>(&self, path: &str) -> Reply<S> {
        self.request(Method::HEAD).path(path).send::<S>()
    }

    pub fn delete<S: ReplyShape>(&self, path: &str) -> Reply<S> {
        self.request(Method::DELETE).path(path).send::<S>()
    }

    pub fn post<S, B>(&self, path: &str, body: &B) -> Reply<S>
    where
        S: ReplyShape,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST).path(path).json(body).send::<S>()
    }

    pub fn put<S, B>(&self, path: &str, body: &B) -> Reply<S>
    where
        S: ReplyShape,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT).path(path).json(body).send::<S>()
    }

    pub fn patch<S, B>(&self, path: &str, body: &B) -> Reply<S>
    where
        S: ReplyShape,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH).path(path).json(body).send::<S>()
    }

    /// Begin a paged iteration over this class, starting at `start`.
    ///
    /// Each page is fetched with GET; cursors that are absolute URLs
    /// (paging links) are followed as-is.
    pub fn get_paged<T>(&self, start: impl Into<Cursor>) -> PagedReply<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let class = self.clone();
        PagedReply::new(start.into(), move |cursor: &Cursor| {
            class.get::<Paged<T>>(cursor.as_str())
        })
    }
}

pub struct RequestBuilder {
    inner: Arc<ClientInner>,
    class_path: String,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Result<Vec<u8>, CodecError>>,
}

impl RequestBuilder {
    /// Path segment below the class. Absolute `http(s)` URLs bypass the
    /// base URL entirely; a leading `/` resolves against the base root.
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// JSON-encode `body` for the request. Encoding faults surface
    /// through the reply's decode-error handler.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = Some(codec::to_bytes(body));
        self
    }

    /// Issue the exchange and hand back the one-shot reply handle.
    pub fn send<S: ReplyShape>(self) -> Reply<S> {
        let (tx, rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let reply = Reply::new(rx, cancel.clone());

        // Preflight faults complete the reply immediately, through the
        // same one-shot channel a live exchange would use.
        let body = match self.body {
            Some(Err(cause)) => {
                let _ = tx.send(ExchangeResult::Codec(cause));
                return reply;
            }
            Some(Ok(bytes)) => Some(bytes),
            None => None,
        };

        let request = match build_request(
            &self.inner.config.base_url,
            &self.class_path,
            &self.path,
            &self.query,
            &self.headers,
            self.method,
            body,
        ) {
            Ok(request) => request,
            Err(error) => {
                let _ = tx.send(ExchangeResult::Transport(error));
                return reply;
            }
        };

        log::debug!("issuing {} {}", request.method, request.url);

        let transport = self.inner.transport.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    log::debug!("exchange cancelled before completion");
                }
                result = transport.send(request) => {
                    let _ = tx.send(match result {
                        Ok(response) => ExchangeResult::Response(response),
                        Err(error) => ExchangeResult::Transport(error),
                    });
                }
            }
        });

        reply
    }
}

fn build_request(
    base: &Url,
    class_path: &str,
    path: &str,
    query: &[(String, String)],
    headers: &[(String, String)],
    method: Method,
    body: Option<Vec<u8>>,
) -> Result<TransportRequest, TransportError> {
    let mut url = resolve_url(base, class_path, path)?;

    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in query {
            pairs.append_pair(name, value);
        }
    }

    let mut header_map = HeaderMap::new();
    if body.is_some() {
        header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    for (name, value) in headers {
        let name = HeaderName::try_from(name.as_str()).map_err(invalid_request)?;
        let value = HeaderValue::try_from(value.as_str()).map_err(invalid_request)?;
        header_map.insert(name, value);
    }

    Ok(TransportRequest {
        method,
        url,
        headers: header_map,
        body,
    })
}

fn resolve_url(base: &Url, class_path: &str, path: &str) -> Result<Url, TransportError> {
    // Paging links come back as absolute URLs; fetch those untouched.
    if path.starts_with("http://") || path.starts_with("https://") {
        return Url::parse(path).map_err(invalid_request);
    }

    let skip_class = path.starts_with('/');
    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            TransportError::new(
                TransportErrorKind::InvalidRequest,
                "base URL cannot carry request paths",
            )
        })?;
        segments.pop_if_empty();

        let class_part = if skip_class { "" } else { class_path };
        for segment in class_part.split('/').chain(path.split('/')) {
            if !segment.is_empty() {
                segments.push(segment);
            }
        }
    }

    Ok(url)
}

fn invalid_request(error: impl std::fmt::Display) -> TransportError {
    TransportError::new(TransportErrorKind::InvalidRequest, error.to_string())
}

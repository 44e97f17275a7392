use crate::net::{Response, Transport, TransportError, TransportErrorKind, TransportRequest};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::Duration;

/// Production transport backed by a shared [`reqwest::Client`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::new(TransportErrorKind::InvalidRequest, e.to_string()))?;

        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'static, Result<Response, TransportError>> {
        let client = self.client.clone();

        async move {
            let mut builder = client
                .request(request.method, request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let res = builder.send().await.map_err(map_error)?;

            let final_url = res.url().clone();
            let status = res.status().as_u16();
            let status_text = res
                .status()
                .canonical_reason()
                .unwrap_or_default()
                .to_string();
            let headers = res.headers().clone();

            // Body is collected in full; streaming is not a reply concern.
            let body = res.bytes().await.map_err(map_error)?.to_vec();

            Ok(Response {
                url: final_url,
                status,
                status_text,
                headers,
                body,
            })
        }
        .boxed()
    }
}

fn map_error(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_builder() || err.is_request() {
        TransportErrorKind::InvalidRequest
    } else {
        TransportErrorKind::Protocol
    };

    TransportError::new(kind, err.to_string())
}

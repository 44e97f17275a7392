//! Chained multi-page iteration.
//!
//! A [`PagedReply`] stitches successive page fetches into one logical,
//! cancelable iteration over items. The session drives an explicit state
//! machine (`Pending → Fetching → Dispatching → {Fetching | Done |
//! Stopped | Failed}`) with at most one reply in flight at a time, so
//! items arrive in strictly increasing global-index order across page
//! boundaries regardless of individual page sizes.

use crate::codec::CodecError;
use crate::net::TransportError;
use crate::reply::outcome::Outcome;
use crate::reply::shape::Paged;
use crate::reply::{Reply, ReplyId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Opaque token identifying the next page to fetch.
///
/// Servers hand these back inside the page envelope; absence means there
/// are no further pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One fetched page: an ordered run of items plus its envelope.
///
/// Only `items` is required; everything else is optional server metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<Cursor>,
    pub previous: Option<Cursor>,
    pub total: Option<u64>,
    pub offset: Option<u64>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Terminal result of one paging iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Every page was exhausted.
    Done,
    /// The consumer returned `false`, or the session was cancelled.
    Stopped,
    /// A page fetch produced a failure, transport error, or decode failure.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Pending,
    Fetching,
    Dispatching,
    Done,
    Stopped,
    Failed,
}

fn advance(state: &mut SessionState, to: SessionState) {
    log::trace!("paging session {state:?} -> {to:?}");
    *state = to;
}

type PageFetcher<T> = Box<dyn FnMut(&Cursor) -> Reply<Paged<T>> + Send>;
type PageFailureHandler<T> = Box<dyn FnOnce(ReplyId, u16, Page<T>) + Send>;
type PageErrorHandler = Box<dyn FnOnce(ReplyId, TransportError) + Send>;
type PageDecodeHandler = Box<dyn FnOnce(ReplyId, CodecError) + Send>;

/// Stateful driver chaining successive page fetches into one ordered
/// item stream.
pub struct PagedReply<T: DeserializeOwned + Send + 'static> {
    start: Cursor,
    fetch: PageFetcher<T>,
    cancel: CancellationToken,
    on_failed: Option<PageFailureHandler<T>>,
    on_error: Option<PageErrorHandler>,
    on_decode_error: Option<PageDecodeHandler>,
}

impl<T: DeserializeOwned + Send + 'static> PagedReply<T> {
    pub(crate) fn new(
        start: Cursor,
        fetch: impl FnMut(&Cursor) -> Reply<Paged<T>> + Send + 'static,
    ) -> Self {
        Self {
            start,
            fetch: Box::new(fetch),
            cancel: CancellationToken::new(),
            on_failed: None,
            on_error: None,
            on_decode_error: None,
        }
    }

    /// Session-level handler for a page answered with a non-2xx status.
    /// Last registration wins.
    pub fn on_failed(
        mut self,
        handler: impl FnOnce(ReplyId, u16, Page<T>) + Send + 'static,
    ) -> Self {
        self.on_failed = Some(Box::new(handler));
        self
    }

    /// Session-level handler for a transport-level page-fetch failure.
    /// Last registration wins.
    pub fn on_error(
        mut self,
        handler: impl FnOnce(ReplyId, TransportError) + Send + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Session-level handler for a page body that did not conform.
    /// Last registration wins.
    pub fn on_decode_error(
        mut self,
        handler: impl FnOnce(ReplyId, CodecError) + Send + 'static,
    ) -> Self {
        self.on_decode_error = Some(Box::new(handler));
        self
    }

    /// Token that stops the session. Cancelling while a fetch is in
    /// flight cancels that fetch; the session ends as `Stopped`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drive the whole iteration, invoking `each` once per item in
    /// increasing global-index order starting at 0, across however many
    /// pages are required.
    ///
    /// `each` returning `false` halts the iteration permanently: no
    /// further pages are fetched and no further items are delivered.
    pub async fn iterate<F>(mut self, mut each: F) -> SessionEnd
    where
        F: FnMut(T, u64) -> bool,
    {
        let mut state = SessionState::Pending;
        let mut cursor = self.start.clone();
        let mut index: u64 = 0;

        loop {
            advance(&mut state, SessionState::Fetching);
            log::debug!("fetching page at cursor {cursor}");

            let reply = (self.fetch)(&cursor);
            let reply_id = reply.id();
            let reply_token = reply.cancellation_token();

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    reply_token.cancel();
                    None
                }
                outcome = reply.into_outcome() => outcome,
            };

            let Some(outcome) = outcome else {
                advance(&mut state, SessionState::Stopped);
                log::debug!("paging session cancelled at cursor {cursor}");
                return SessionEnd::Stopped;
            };

            match outcome {
                Outcome::Success { status: _, data: page } => {
                    advance(&mut state, SessionState::Dispatching);
                    let next = page.next.clone();

                    for item in page.items {
                        if !each(item, index) {
                            advance(&mut state, SessionState::Stopped);
                            log::debug!("paging session stopped by consumer at index {index}");
                            return SessionEnd::Stopped;
                        }
                        index += 1;
                    }

                    match next {
                        None => {
                            advance(&mut state, SessionState::Done);
                            log::debug!("paging session done after {index} items");
                            return SessionEnd::Done;
                        }
                        // A cursor that does not move means no more pages;
                        // anything else would loop forever.
                        Some(next) if next == cursor => {
                            advance(&mut state, SessionState::Done);
                            log::debug!("next cursor {next} equals current, treating as final page");
                            return SessionEnd::Done;
                        }
                        Some(next) => cursor = next,
                    }
                }
                Outcome::Failure { status, data } => {
                    advance(&mut state, SessionState::Failed);
                    if let Some(handler) = self.on_failed.take() {
                        handler(reply_id, status, data);
                    }
                    return SessionEnd::Failed;
                }
                Outcome::TransportError(error) => {
                    advance(&mut state, SessionState::Failed);
                    if let Some(handler) = self.on_error.take() {
                        handler(reply_id, error);
                    }
                    return SessionEnd::Failed;
                }
                Outcome::DecodeFailure(cause) => {
                    advance(&mut state, SessionState::Failed);
                    if let Some(handler) = self.on_decode_error.take() {
                        handler(reply_id, cause);
                    }
                    return SessionEnd::Failed;
                }
            }
        }
    }

    /// Spawn [`iterate`](PagedReply::iterate) onto the runtime and drop
    /// the handle.
    pub fn detach_iterate<F>(self, each: F) -> JoinHandle<SessionEnd>
    where
        F: FnMut(T, u64) -> bool + Send + 'static,
    {
        tokio::spawn(self.iterate(each))
    }
}

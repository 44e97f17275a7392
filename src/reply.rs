//! One-shot asynchronous reply handles.
//!
//! A [`Reply`] wraps a single in-flight exchange. Callers register at most
//! one handler per outcome kind, then either drive the reply to completion
//! with [`join`](Reply::join) or detach it onto the runtime with
//! [`detach`](Reply::detach). Exactly one handler kind fires, exactly
//! once; an unregistered kind drops its payload silently, but the
//! finished signal fires either way so owners can await completion
//! without registering anything.
//!
//! Because registration consumes the handle, registering after completion
//! is unrepresentable, and because the issuing task owns the only
//! `oneshot::Sender`, a second delivery is unrepresentable too.

pub mod outcome;
pub mod shape;

use crate::codec::CodecError;
use crate::net::{TransportError, TransportErrorKind};
use outcome::{decode_outcome, ExchangeResult, Outcome};
use shape::ReplyShape;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A unique identifier for one reply.
///
/// Handlers receive the id of the reply that fired them, so callers can
/// correlate a callback with the handle they issued.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReplyId(Uuid);

impl ReplyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// How a driven reply ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 2xx status, body decoded under the declared shape.
    Succeeded,
    /// Non-2xx status, body decoded under the declared shape.
    Failed,
    /// The exchange failed before a response existed.
    TransportError,
    /// The body (or the request body) did not conform to the shape.
    DecodeFailure,
    /// The reply was cancelled before completion; nothing was dispatched.
    Cancelled,
}

type PayloadHandler<S> = Box<dyn FnOnce(ReplyId, u16, <S as ReplyShape>::Output) + Send>;
type ErrorHandler = Box<dyn FnOnce(ReplyId, TransportError) + Send>;
type DecodeHandler = Box<dyn FnOnce(ReplyId, CodecError) + Send>;

/// One-shot handle around a single exchange's decoding and dispatch.
pub struct Reply<S: ReplyShape> {
    id: ReplyId,
    rx: oneshot::Receiver<ExchangeResult>,
    cancel: CancellationToken,
    finished: watch::Sender<bool>,
    on_succeeded: Option<PayloadHandler<S>>,
    on_failed: Option<PayloadHandler<S>>,
    on_error: Option<ErrorHandler>,
    on_decode_error: Option<DecodeHandler>,
}

impl<S: ReplyShape> Reply<S> {
    pub(crate) fn new(rx: oneshot::Receiver<ExchangeResult>, cancel: CancellationToken) -> Self {
        let (finished, _) = watch::channel(false);

        Self {
            id: ReplyId::new(),
            rx,
            cancel,
            finished,
            on_succeeded: None,
            on_failed: None,
            on_error: None,
            on_decode_error: None,
        }
    }

    pub fn id(&self) -> ReplyId {
        self.id
    }

    /// Register the handler for 2xx outcomes. Last registration wins.
    pub fn on_succeeded(
        mut self,
        handler: impl FnOnce(ReplyId, u16, S::Output) + Send + 'static,
    ) -> Self {
        self.on_succeeded = Some(Box::new(handler));
        self
    }

    /// Register the handler for non-2xx outcomes. Last registration wins.
    pub fn on_failed(
        mut self,
        handler: impl FnOnce(ReplyId, u16, S::Output) + Send + 'static,
    ) -> Self {
        self.on_failed = Some(Box::new(handler));
        self
    }

    /// Register the handler for transport-level failures. Last registration wins.
    pub fn on_error(
        mut self,
        handler: impl FnOnce(ReplyId, TransportError) + Send + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Register the handler for codec failures in either direction.
    /// Last registration wins.
    pub fn on_decode_error(
        mut self,
        handler: impl FnOnce(ReplyId, CodecError) + Send + 'static,
    ) -> Self {
        self.on_decode_error = Some(Box::new(handler));
        self
    }

    /// Token that cancels this exchange. Cancelling before the result
    /// arrives suppresses all dispatch; a result arriving afterwards is
    /// discarded.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Completion observation, usable with zero handlers registered.
    ///
    /// The signal also resolves when the reply is dropped unconsumed.
    pub fn finished(&self) -> FinishedSignal {
        FinishedSignal {
            rx: self.finished.subscribe(),
        }
    }

    /// Drive the exchange to completion, dispatching exactly one handler.
    pub async fn join(mut self) -> Disposition {
        let exchange = Self::await_exchange(&mut self.rx, &self.cancel).await;

        let disposition = match exchange {
            None => {
                log::debug!("reply {:?} cancelled before completion", self.id);
                Disposition::Cancelled
            }
            Some(result) => self.dispatch(decode_outcome::<S>(result)),
        };

        self.finished.send_replace(true);
        disposition
    }

    /// Spawn [`join`](Reply::join) onto the runtime and drop the handle.
    pub fn detach(self) -> JoinHandle<Disposition>
    where
        S: 'static,
    {
        tokio::spawn(self.join())
    }

    /// Resolve the outcome without dispatching handlers. Used by the
    /// paging engine, which owns dispatch at the session level.
    pub(crate) async fn into_outcome(mut self) -> Option<Outcome<S>> {
        let outcome = Self::await_exchange(&mut self.rx, &self.cancel)
            .await
            .map(decode_outcome::<S>);
        self.finished.send_replace(true);
        outcome
    }

    async fn await_exchange(
        rx: &mut oneshot::Receiver<ExchangeResult>,
        cancel: &CancellationToken,
    ) -> Option<ExchangeResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = rx => Some(result.unwrap_or_else(|_| {
                ExchangeResult::Transport(TransportError::new(
                    TransportErrorKind::Aborted,
                    "exchange abandoned before a result was delivered",
                ))
            })),
        }
    }

    fn dispatch(&mut self, outcome: Outcome<S>) -> Disposition {
        match outcome {
            Outcome::Success { status, data } => {
                if let Some(handler) = self.on_succeeded.take() {
                    handler(self.id, status, data);
                } else {
                    log::trace!("reply {:?}: success {status} dropped, no handler", self.id);
                }
                Disposition::Succeeded
            }
            Outcome::Failure { status, data } => {
                if let Some(handler) = self.on_failed.take() {
                    handler(self.id, status, data);
                } else {
                    log::trace!("reply {:?}: failure {status} dropped, no handler", self.id);
                }
                Disposition::Failed
            }
            Outcome::TransportError(error) => {
                if let Some(handler) = self.on_error.take() {
                    handler(self.id, error);
                } else {
                    log::trace!("reply {:?}: transport error dropped, no handler", self.id);
                }
                Disposition::TransportError
            }
            Outcome::DecodeFailure(cause) => {
                if let Some(handler) = self.on_decode_error.take() {
                    handler(self.id, cause);
                } else {
                    log::trace!("reply {:?}: decode failure dropped, no handler", self.id);
                }
                Disposition::DecodeFailure
            }
        }
    }
}

/// Future-like view of a reply's write-once completion flag.
pub struct FinishedSignal {
    rx: watch::Receiver<bool>,
}

impl FinishedSignal {
    /// Resolves once the reply has dispatched, was cancelled, or was
    /// dropped without being driven.
    pub async fn wait(mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

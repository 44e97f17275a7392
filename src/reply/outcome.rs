//! The outcome decoder: a pure function from one completed exchange to
//! exactly one tagged [`Outcome`].
//!
//! Status classification is fixed policy: 2xx is success, everything else
//! is failure. Structural decoding is attempted for failure statuses too,
//! since error bodies commonly share the declared shape; a body that does
//! not conform yields [`Outcome::DecodeFailure`] regardless of status.

use crate::codec::CodecError;
use crate::net::{Response, TransportError};
use crate::reply::shape::ReplyShape;

/// Raw result of one exchange, before shape decoding.
#[derive(Debug)]
pub enum ExchangeResult {
    /// A status line and body arrived.
    Response(Response),
    /// The exchange failed before any response existed.
    Transport(TransportError),
    /// The request body could not be encoded; nothing was issued.
    Codec(CodecError),
}

/// The single tagged result of one completed exchange.
pub enum Outcome<S: ReplyShape> {
    Success { status: u16, data: S::Output },
    Failure { status: u16, data: S::Output },
    TransportError(TransportError),
    DecodeFailure(CodecError),
}

pub(crate) fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Decode one exchange result under the declared shape.
///
/// Transport errors and request-encode faults bypass structural decoding
/// entirely; the body is never inspected for them.
pub fn decode_outcome<S: ReplyShape>(result: ExchangeResult) -> Outcome<S> {
    match result {
        ExchangeResult::Transport(error) => Outcome::TransportError(error),
        ExchangeResult::Codec(cause) => Outcome::DecodeFailure(cause),
        ExchangeResult::Response(response) => match S::decode(&response.body) {
            Err(cause) => Outcome::DecodeFailure(cause),
            Ok(data) if is_success(response.status) => Outcome::Success {
                status: response.status,
                data,
            },
            Ok(data) => Outcome::Failure {
                status: response.status,
                data,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::TransportErrorKind;
    use http::HeaderMap;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Post {
        id: u32,
    }

    fn response(status: u16, body: &[u8]) -> ExchangeResult {
        ExchangeResult::Response(Response {
            url: Url::parse("http://localhost:3000/posts/1").unwrap(),
            status,
            status_text: String::new(),
            headers: HeaderMap::new(),
            body: body.to_vec(),
        })
    }

    #[test]
    fn success_statuses_with_valid_bodies_decode_to_success() {
        for status in [200, 201, 226, 299] {
            match decode_outcome::<crate::reply::shape::Object<Post>>(response(status, br#"{"id": 3}"#)) {
                Outcome::Success { status: s, data } => {
                    assert_eq!(s, status);
                    assert_eq!(data, Post { id: 3 });
                }
                _ => panic!("expected success for status {status}"),
            }
        }
    }

    #[test]
    fn failure_statuses_with_conforming_bodies_decode_to_failure() {
        for status in [199, 301, 400, 404, 500] {
            match decode_outcome::<crate::reply::shape::Object<Post>>(response(status, br#"{"id": 3}"#)) {
                Outcome::Failure { status: s, data } => {
                    assert_eq!(s, status);
                    assert_eq!(data, Post { id: 3 });
                }
                _ => panic!("expected failure for status {status}"),
            }
        }
    }

    #[test]
    fn nonconforming_body_is_a_decode_failure_regardless_of_status() {
        for status in [200, 404] {
            match decode_outcome::<crate::reply::shape::Object<Post>>(response(status, b"not json")) {
                Outcome::DecodeFailure(cause) => {
                    assert!(matches!(cause, CodecError::Decode(_)))
                }
                _ => panic!("expected decode failure for status {status}"),
            }
        }
    }

    #[test]
    fn transport_error_never_reaches_the_decode_path() {
        static DECODE_CALLS: AtomicUsize = AtomicUsize::new(0);

        struct Counting;
        impl ReplyShape for Counting {
            type Output = ();
            fn decode(_body: &[u8]) -> Result<(), CodecError> {
                DECODE_CALLS.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let error = TransportError::new(TransportErrorKind::Timeout, "deadline elapsed");
        match decode_outcome::<Counting>(ExchangeResult::Transport(error)) {
            Outcome::TransportError(e) => assert_eq!(e.kind, TransportErrorKind::Timeout),
            _ => panic!("expected transport error"),
        }
        assert_eq!(DECODE_CALLS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn encode_fault_surfaces_as_decode_failure() {
        let cause = crate::codec::to_bytes(
            &std::collections::BTreeMap::from([(vec![1u8], 2u8)]),
        )
        .unwrap_err();
        match decode_outcome::<crate::reply::shape::Empty>(ExchangeResult::Codec(cause)) {
            Outcome::DecodeFailure(c) => assert!(matches!(c, CodecError::Encode(_))),
            _ => panic!("expected decode failure"),
        }
    }
}

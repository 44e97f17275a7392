//! Declared reply shapes.
//!
//! A reply is bound to exactly one shape for its whole lifetime, via the
//! type parameter on [`Reply`](crate::reply::Reply). The shape fixes what
//! structural decoding must attempt:
//!
//! - [`Empty`]: no payload expected, the body is ignored.
//! - [`Json`]: a generic JSON value, passed through undecoded.
//! - [`Object<T>`]: a single entity.
//! - [`ObjectList<T>`]: a sequence of entities.
//! - [`Paged<T>`]: one page of entities plus its next-page cursor.

use crate::codec::{self, CodecError};
use crate::paging::Page;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

/// One of the closed set of payload shapes a reply can be declared with.
pub trait ReplyShape {
    type Output: Send + 'static;

    fn decode(body: &[u8]) -> Result<Self::Output, CodecError>;
}

/// No payload expected; the body is ignored.
pub struct Empty;

impl ReplyShape for Empty {
    type Output = ();

    fn decode(_body: &[u8]) -> Result<Self::Output, CodecError> {
        Ok(())
    }
}

/// Raw JSON passthrough. An empty body decodes to `Value::Null`.
pub struct Json;

impl ReplyShape for Json {
    type Output = Value;

    fn decode(body: &[u8]) -> Result<Self::Output, CodecError> {
        codec::from_bytes_value(body)
    }
}

/// A single entity of type `T`.
pub struct Object<T>(PhantomData<T>);

impl<T: DeserializeOwned + Send + 'static> ReplyShape for Object<T> {
    type Output = T;

    fn decode(body: &[u8]) -> Result<Self::Output, CodecError> {
        codec::from_bytes(body)
    }
}

/// A sequence of entities of type `T`.
pub struct ObjectList<T>(PhantomData<T>);

impl<T: DeserializeOwned + Send + 'static> ReplyShape for ObjectList<T> {
    type Output = Vec<T>;

    fn decode(body: &[u8]) -> Result<Self::Output, CodecError> {
        codec::from_bytes(body)
    }
}

/// One page of entities of type `T`, with its pagination envelope.
pub struct Paged<T>(PhantomData<T>);

impl<T: DeserializeOwned + Send + 'static> ReplyShape for Paged<T> {
    type Output = Page<T>;

    fn decode(body: &[u8]) -> Result<Self::Output, CodecError> {
        codec::from_bytes(body)
    }
}

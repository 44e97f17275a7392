pub mod class;
pub mod client;
pub mod codec;
pub mod config;
pub mod errors;
pub mod net;
pub mod paging;
pub mod reply;

pub use class::{RequestBuilder, RestClass};
pub use client::{RestClient, RestClientBuilder};
pub use config::ClientConfig;
pub use errors::ClientError;
pub use http::Method;
pub use paging::{Cursor, Page, PagedReply, SessionEnd};
pub use reply::shape::{Empty, Json, Object, ObjectList, Paged, ReplyShape};
pub use reply::{Disposition, FinishedSignal, Reply, ReplyId};

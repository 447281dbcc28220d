//! Client for the OSIsoft PI Web API.
//!
//! Every call goes through an [`Executor`], which checks the status code,
//! looks inside the JSON body for the server's embedded `Errors` list,
//! retries reads while the database is being crawled, and applies the
//! per-call [`ErrorPolicy`]. Results come back as an [`ApiResponse`] pairing
//! the raw response with the session that produced it.

mod batch;
mod envelope;
mod errors;
mod executor;
mod policy;
mod retry;
mod session;
#[cfg(test)]
mod test_support;
pub mod typed_list;
mod webapi;

pub use self::batch::{
    build_batch_payload, normalize_base_url, BatchPayload, BatchRequest, PointRef, StreamPoint,
};
pub use self::envelope::ApiResponse;
pub use self::errors::{Error, ServerError, CRAWLING_ERROR_CODE};
pub use self::executor::{get, post, put, Executor};
pub use self::policy::{ErrorPolicy, FaultSink, LogFaults};
pub use self::retry::CrawlRetry;
pub use self::session::{Auth, HttpSession, RawResponse, Request, Session, SessionConfig};
pub use self::typed_list::{JsonKind, TypedList, TypedListError, Variant};
pub use self::webapi::{response, webapi, WebApi};
pub use reqwest::Method;

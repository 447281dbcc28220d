//! The value every executor call hands back.

use serde::de::DeserializeOwned;

use crate::session::RawResponse;
use crate::Error;

/// Pairs the final HTTP response of a call with the session that produced it.
///
/// Under [`ErrorPolicy::Continue`](crate::ErrorPolicy::Continue) the response
/// may carry a status or body that failed a check; callers must not assume
/// the payload is valid in that case.
#[derive(Debug)]
pub struct ApiResponse<'s, S> {
    pub response: RawResponse,
    pub session: &'s S,
}

impl<'s, S> ApiResponse<'s, S> {
    pub fn new(response: RawResponse, session: &'s S) -> Self {
        Self { response, session }
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    /// Decodes the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        self.response.json()
    }

    pub fn into_response(self) -> RawResponse {
        self.response
    }
}

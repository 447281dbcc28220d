//! Request executor: issues GET/POST/PUT calls on a session and turns the
//! server's answers into typed errors.
//!
//! The server reports many failures inside otherwise successful (200)
//! responses, through a top-level `Errors` list in the JSON body. Every call
//! therefore runs two checks: the status code, then (GET and PUT) the body.
//! Each check that fails produces an [`Error`]; the call's [`ErrorPolicy`]
//! decides whether that error aborts the call or is handed to the executor's
//! [`FaultSink`] while the call carries on.
//!
//! A GET whose first embedded error carries `ErrorCode` 20 (the database is
//! being crawled) is reissued after a backoff, up to the limit set by
//! [`CrawlRetry`]. Running out of attempts is always fatal.

use reqwest::Method;

use crate::envelope::ApiResponse;
use crate::errors::embedded_errors;
use crate::policy::{ErrorPolicy, FaultSink, LogFaults};
use crate::retry::CrawlRetry;
use crate::session::{RawResponse, Request, Session};
use crate::Error;

const UNAUTHORIZED: u16 = 401;
const OK: u16 = 200;
const ACCEPTED: u16 = 202;

/// Outcome of inspecting a JSON body.
enum BodyCheck {
    Clean,
    Crawling,
    Fault(Error),
}

/// Executes requests with status checks, body inspection and crawl retries.
#[derive(Debug, Clone)]
pub struct Executor<K = LogFaults> {
    retry: CrawlRetry,
    sink: K,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    /// Executor with the default crawl retry schedule, logging suppressed
    /// faults through `tracing`.
    pub fn new() -> Self {
        Self {
            retry: CrawlRetry::default(),
            sink: LogFaults,
        }
    }
}

impl<K: FaultSink> Executor<K> {
    pub fn with_retry(mut self, retry: CrawlRetry) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the sink that receives faults suppressed under `Continue`.
    pub fn with_sink<K2: FaultSink>(self, sink: K2) -> Executor<K2> {
        Executor {
            retry: self.retry,
            sink,
        }
    }

    pub fn retry(&self) -> &CrawlRetry {
        &self.retry
    }

    /// GET `url`, expecting 200 and a JSON body free of embedded errors.
    pub async fn get<'s, S: Session>(
        &self,
        url: &str,
        session: &'s S,
        params: &[(&str, &str)],
        policy: ErrorPolicy,
    ) -> Result<ApiResponse<'s, S>, Error> {
        let request = Request::new(Method::GET, url).with_params(params);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let response = session.execute(request.clone()).await?;
            self.check_status(url, &response, OK, policy)?;

            // A 401 is never retried, even when its body reports a crawl.
            match inspect_body(&response, response.status != UNAUTHORIZED) {
                BodyCheck::Clean => {}
                BodyCheck::Crawling => {
                    if !self.retry.allows_retry(attempts) {
                        tracing::error!(
                            url = %url,
                            attempts,
                            "Database is still being crawled, giving up"
                        );
                        return Err(Error::CrawlTimeout { attempts });
                    }
                    let delay = self.retry.delay_for_retry(attempts);
                    tracing::info!(
                        url = %url,
                        attempt = attempts,
                        "Database is being crawled. Retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                BodyCheck::Fault(fault) => self.apply(policy, url, fault)?,
            }

            return Ok(ApiResponse::new(response, session));
        }
    }

    /// POST `json` to `url`, expecting 202. The body of the answer is not
    /// inspected.
    pub async fn post<'s, S: Session>(
        &self,
        url: &str,
        session: &'s S,
        params: &[(&str, &str)],
        json: Option<&serde_json::Value>,
        policy: ErrorPolicy,
    ) -> Result<ApiResponse<'s, S>, Error> {
        let request = Request::new(Method::POST, url)
            .with_params(params)
            .with_json(json);
        let response = session.execute(request).await?;
        self.check_status(url, &response, ACCEPTED, policy)?;
        Ok(ApiResponse::new(response, session))
    }

    /// PUT `url`, expecting 200 and a JSON body free of embedded errors.
    /// There is no crawl retry here: `ErrorCode` 20 is reported like any
    /// other server error.
    pub async fn put<'s, S: Session>(
        &self,
        url: &str,
        session: &'s S,
        params: &[(&str, &str)],
        policy: ErrorPolicy,
    ) -> Result<ApiResponse<'s, S>, Error> {
        let request = Request::new(Method::PUT, url).with_params(params);
        let response = session.execute(request).await?;
        self.check_status(url, &response, OK, policy)?;
        if let BodyCheck::Fault(fault) = inspect_body(&response, false) {
            self.apply(policy, url, fault)?;
        }
        Ok(ApiResponse::new(response, session))
    }

    fn check_status(
        &self,
        url: &str,
        response: &RawResponse,
        expected: u16,
        policy: ErrorPolicy,
    ) -> Result<(), Error> {
        if response.status == UNAUTHORIZED {
            return self.apply(policy, url, Error::Unauthorized);
        }
        if response.status != expected {
            let fault = Error::HttpStatus {
                status: response.status,
                reason: response.reason.clone(),
            };
            return self.apply(policy, url, fault);
        }
        Ok(())
    }

    fn apply(&self, policy: ErrorPolicy, url: &str, fault: Error) -> Result<(), Error> {
        match policy {
            ErrorPolicy::Stop => {
                tracing::error!(url = %url, "{}", fault);
                Err(fault)
            }
            ErrorPolicy::Continue => {
                self.sink.fault_suppressed(url, &fault);
                Ok(())
            }
        }
    }
}

fn inspect_body(response: &RawResponse, retry_crawling: bool) -> BodyCheck {
    let body: serde_json::Value = match response.json() {
        Ok(body) => body,
        Err(e) => return BodyCheck::Fault(e),
    };
    match embedded_errors(&body) {
        None => BodyCheck::Clean,
        Some(errors) if retry_crawling && errors[0].is_crawling() => BodyCheck::Crawling,
        Some(errors) => BodyCheck::Fault(Error::PiWebApi { errors }),
    }
}

/// GET with the default [`Executor`].
pub async fn get<'s, S: Session>(
    url: &str,
    session: &'s S,
    params: &[(&str, &str)],
    policy: ErrorPolicy,
) -> Result<ApiResponse<'s, S>, Error> {
    Executor::new().get(url, session, params, policy).await
}

/// POST with the default [`Executor`].
pub async fn post<'s, S: Session>(
    url: &str,
    session: &'s S,
    params: &[(&str, &str)],
    json: Option<&serde_json::Value>,
    policy: ErrorPolicy,
) -> Result<ApiResponse<'s, S>, Error> {
    Executor::new()
        .post(url, session, params, json, policy)
        .await
}

/// PUT with the default [`Executor`].
pub async fn put<'s, S: Session>(
    url: &str,
    session: &'s S,
    params: &[(&str, &str)],
    policy: ErrorPolicy,
) -> Result<ApiResponse<'s, S>, Error> {
    Executor::new().put(url, session, params, policy).await
}

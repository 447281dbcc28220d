//! Entry point: a connected handle on a PI Web API root.

use reqwest::Method;
use serde_json::Value;

use crate::batch::{normalize_base_url, StreamPoint};
use crate::envelope::ApiResponse;
use crate::policy::{ErrorPolicy, FaultSink, LogFaults};
use crate::session::{HttpSession, RawResponse, Session, SessionConfig};
use crate::{Error, Executor};

/// A PI Web API server reached through one session.
///
/// Holds the base URL (always ending in `/`), the session every call goes
/// through, and the root document returned when connecting.
#[derive(Debug)]
pub struct WebApi<S = HttpSession, K = LogFaults> {
    url: String,
    session: S,
    executor: Executor<K>,
    root: Value,
}

impl<S: Session> WebApi<S> {
    /// Connects with the default executor.
    pub async fn connect(url: &str, session: S, policy: ErrorPolicy) -> Result<Self, Error> {
        Self::connect_with(url, session, Executor::new(), policy).await
    }
}

impl<S: Session, K: FaultSink> WebApi<S, K> {
    /// GETs the root document at `url` and keeps it alongside the session.
    pub async fn connect_with(
        url: &str,
        session: S,
        executor: Executor<K>,
        policy: ErrorPolicy,
    ) -> Result<Self, Error> {
        let url = normalize_base_url(url);
        let root = {
            let resp = executor.get(&url, &session, &[], policy).await?;
            // Under Continue the root may be unreadable; keep an empty document.
            resp.json::<Value>().unwrap_or(Value::Null)
        };
        tracing::debug!(url = %url, "connected to PI Web API");
        Ok(Self {
            url,
            session,
            executor,
            root,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The root document's `Links` object, if it had one.
    pub fn links(&self) -> Option<&serde_json::Map<String, Value>> {
        self.root.get("Links").and_then(Value::as_object)
    }

    /// Resolves `path` against the base URL. Absolute URLs pass through.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.url, path.trim_start_matches('/'))
        }
    }

    pub async fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
        policy: ErrorPolicy,
    ) -> Result<ApiResponse<'_, S>, Error> {
        self.executor
            .get(&self.resolve(path), &self.session, params, policy)
            .await
    }

    pub async fn post(
        &self,
        path: &str,
        params: &[(&str, &str)],
        json: Option<&Value>,
        policy: ErrorPolicy,
    ) -> Result<ApiResponse<'_, S>, Error> {
        self.executor
            .post(&self.resolve(path), &self.session, params, json, policy)
            .await
    }

    pub async fn put(
        &self,
        path: &str,
        params: &[(&str, &str)],
        policy: ErrorPolicy,
    ) -> Result<ApiResponse<'_, S>, Error> {
        self.executor
            .put(&self.resolve(path), &self.session, params, policy)
            .await
    }

    /// Runs `action` on every point through the batch endpoint.
    pub async fn batch<P: StreamPoint>(
        &self,
        method: Method,
        points: &[P],
        action: &str,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse<'_, S>, Error> {
        self.executor
            .batch(&self.session, &self.url, method, points, action, params)
            .await
    }
}

/// Opens an [`HttpSession`] with `config` and connects to `url`.
pub async fn webapi(url: &str, config: SessionConfig) -> Result<WebApi, Error> {
    let session = HttpSession::new(config)?;
    WebApi::connect(url, session, ErrorPolicy::Stop).await
}

/// GETs `url` on a fresh [`HttpSession`] and returns the raw response.
pub async fn response(url: &str, config: SessionConfig) -> Result<RawResponse, Error> {
    let session = HttpSession::new(config)?;
    let resp = Executor::new()
        .get(url, &session, &[], ErrorPolicy::Stop)
        .await?;
    Ok(resp.into_response())
}

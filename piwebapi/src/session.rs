//! The session collaborator: something that can perform one HTTP exchange
//! while keeping cookies, credentials and TLS settings across calls.

use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Error;

/// Request timeout applied to every call unless overridden.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One HTTP call described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl Request {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            params: Vec::new(),
            json: None,
        }
    }

    pub fn with_params(mut self, params: &[(&str, &str)]) -> Self {
        self.params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn with_json(mut self, json: Option<&Value>) -> Self {
        self.json = json.cloned();
        self
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, empty when the code has none.
    pub reason: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            reason,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(Error::MalformedBody)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs HTTP exchanges on behalf of the executor.
///
/// Implementations own connection reuse, cookies, authentication and TLS
/// configuration. The executor only borrows a session for the length of one
/// call and never closes or replaces it.
pub trait Session: Send + Sync {
    fn execute(&self, request: Request) -> impl Future<Output = Result<RawResponse, Error>> + Send;
}

/// How requests authenticate against the server.
#[derive(Clone, Default)]
pub enum Auth {
    #[default]
    Anonymous,
    Basic { username: String, password: String },
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Anonymous => write!(f, "Anonymous"),
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Settings used to build an [`HttpSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub auth: Auth,
    /// When false, self-signed server certificates are accepted.
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auth: Auth::Anonymous,
            verify_tls: true,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl SessionConfig {
    pub fn basic(username: &str, password: &str) -> Self {
        Self {
            auth: Auth::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
            ..Default::default()
        }
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`Session`] backed by a shared `reqwest::Client`.
///
/// Clones share the same connection pool and cookie store.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: reqwest::Client,
    auth: Auth,
}

impl HttpSession {
    pub fn new(config: SessionConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;
        Ok(Self {
            client,
            auth: config.auth,
        })
    }
}

impl Session for HttpSession {
    async fn execute(&self, request: Request) -> Result<RawResponse, Error> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .header("accept", "application/json");
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(json) = &request.json {
            builder = builder.json(json);
        }
        if let Auth::Basic { username, password } = &self.auth {
            builder = builder.basic_auth(username, Some(password));
        }

        let resp = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", request.url, e);
            Error::RequestFailed(e)
        })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed(e)
        })?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: body.to_vec(),
        })
    }
}

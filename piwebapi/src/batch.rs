//! Batch requests: many per-point stream calls multiplexed into one POST
//! against `<baseUrl>batch/`.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::envelope::ApiResponse;
use crate::errors::embedded_errors;
use crate::policy::FaultSink;
use crate::session::{Request, Session};
use crate::{Error, Executor};

/// Anything addressable as a stream: a WebId for the URL and a name to key
/// the batch entry by.
pub trait StreamPoint {
    fn web_id(&self) -> &str;
    fn name(&self) -> &str;
}

/// Minimal owned [`StreamPoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointRef {
    pub web_id: String,
    pub name: String,
}

impl PointRef {
    pub fn new(web_id: &str, name: &str) -> Self {
        Self {
            web_id: web_id.to_string(),
            name: name.to_string(),
        }
    }
}

impl StreamPoint for PointRef {
    fn web_id(&self) -> &str {
        &self.web_id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// One sub-request of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "Resource")]
    pub resource: String,
}

/// Sub-requests keyed by point name. Points sharing a name collapse into the
/// last one.
pub type BatchPayload = BTreeMap<String, BatchRequest>;

/// Ensures `base_url` ends with exactly one `/`.
pub fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

/// Builds the batch body for `action` on every point:
/// `<baseUrl>streams/<webid>/<action>` plus `params` as query string.
pub fn build_batch_payload<P: StreamPoint>(
    base_url: &str,
    method: &Method,
    points: &[P],
    action: &str,
    params: &[(&str, &str)],
) -> Result<BatchPayload, Error> {
    let base = normalize_base_url(base_url);
    let mut payload = BatchPayload::new();

    for point in points {
        let resource = format!("{}streams/{}/{}", base, point.web_id(), action);
        let mut resource = Url::parse(&resource)?;
        if !params.is_empty() {
            resource.query_pairs_mut().extend_pairs(params.iter());
        }
        payload.insert(
            point.name().to_string(),
            BatchRequest {
                method: method.as_str().to_string(),
                resource: resource.to_string(),
            },
        );
    }

    Ok(payload)
}

impl<K: FaultSink> Executor<K> {
    /// Issues `action` for every point in a single POST to the batch endpoint.
    ///
    /// Unlike the single-request calls this takes no [`ErrorPolicy`](crate::ErrorPolicy):
    /// a 401, an undecodable body or a non-empty `Errors` list always fails the
    /// call. Other statuses are passed through, since the server answers a
    /// batch with a multi-status code.
    pub async fn batch<'s, S: Session, P: StreamPoint>(
        &self,
        session: &'s S,
        base_url: &str,
        method: Method,
        points: &[P],
        action: &str,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse<'s, S>, Error> {
        let payload = build_batch_payload(base_url, &method, points, action, params)?;
        let url = format!("{}batch/", normalize_base_url(base_url));
        let body = serde_json::to_value(&payload).map_err(Error::EncodeBody)?;

        tracing::debug!(url = %url, requests = payload.len(), "sending batch");
        let response = session
            .execute(Request::new(Method::POST, &url).with_json(Some(&body)))
            .await?;

        if response.status == 401 {
            tracing::error!(url = %url, "{}", Error::Unauthorized);
            return Err(Error::Unauthorized);
        }

        let decoded: Value = response.json()?;
        if let Some(errors) = embedded_errors(&decoded) {
            let err = Error::PiWebApi { errors };
            tracing::error!(url = %url, "{}", err);
            return Err(err);
        }

        Ok(ApiResponse::new(response, session))
    }
}

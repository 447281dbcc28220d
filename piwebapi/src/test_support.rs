//! In-memory [`Session`] double that replays scripted responses.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::session::{RawResponse, Request, Session};
use crate::Error;

#[derive(Debug, Default)]
pub(crate) struct ScriptedSession {
    responses: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedSession {
    pub(crate) fn new(responses: Vec<RawResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Session for ScriptedSession {
    async fn execute(&self, request: Request) -> Result<RawResponse, Error> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(response) => Ok(response),
            None => panic!("unexpected request: {} {}", request.method, request.url),
        }
    }
}

pub(crate) fn json_response(status: u16, body: Value) -> RawResponse {
    RawResponse::new(status, body.to_string())
}

pub(crate) fn crawling() -> RawResponse {
    json_response(200, serde_json::json!({"Errors": [{"ErrorCode": 20}]}))
}

/// Sink closure that records every suppressed fault's message.
pub(crate) fn recording_sink() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str, &Error) + Send + Sync) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let writer = Arc::clone(&seen);
    let sink = move |_url: &str, fault: &Error| {
        writer.lock().unwrap().push(fault.to_string());
    };
    (seen, sink)
}

//! Scripted request client shared by the unit tests.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::transport::{ApiResult, RequestClient};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<ApiResult>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new(responses: impl IntoIterator<Item = ApiResult>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls").clone()
    }
}

#[async_trait]
impl RequestClient for ScriptedClient {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult {
        self.calls.lock().expect("calls").push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });
        self.responses
            .lock()
            .expect("responses")
            .pop_front()
            .unwrap_or_else(ApiResult::transport_failure)
    }
}

/// Never answers; used to observe the form while a request is in flight.
pub struct StalledClient;

#[async_trait]
impl RequestClient for StalledClient {
    async fn request(&self, _method: Method, _path: &str, _body: Option<Value>) -> ApiResult {
        std::future::pending::<ApiResult>().await
    }
}

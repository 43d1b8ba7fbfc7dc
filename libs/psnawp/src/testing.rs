//! In-memory [`Transport`] for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use psnawp_http::{HttpError, StatusCode};
use serde_json::Value;
use url::Url;

use crate::client::Client;
use crate::endpoints::Endpoints;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(StatusCode),
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct State {
    replies: HashMap<(Method, String), VecDeque<Reply>>,
    calls: Vec<RecordedCall>,
}

/// Records every call and answers from per-route reply queues.
///
/// The last queued reply for a route is repeated; an unknown route answers
/// 404.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_json(&self, method: Method, path: &str, value: Value) {
        self.push(method, path, Reply::Json(value));
    }

    pub fn reply_status(&self, method: Method, path: &str, status: StatusCode) {
        self.push(method, path, Reply::Status(status));
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.state
            .lock()
            .unwrap()
            .replies
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    async fn handle(
        &self,
        method: Method,
        url: &Url,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, HttpError> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(RecordedCall {
                method,
                path: url.path().to_owned(),
                params: params
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), v.clone()))
                    .collect(),
                body: body.cloned(),
            });
            state
                .replies
                .get_mut(&(method, url.path().to_owned()))
                .and_then(|queue| {
                    if queue.len() > 1 {
                        queue.pop_front()
                    } else {
                        queue.front().cloned()
                    }
                })
        };

        // Give concurrent callers a chance to interleave.
        tokio::task::yield_now().await;

        match reply {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Status(status)) => Err(status_error(status)),
            None => Err(status_error(StatusCode::NOT_FOUND)),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: Url, params: &[(&str, String)]) -> Result<Value, HttpError> {
        self.handle(Method::Get, &url, params, None).await
    }

    async fn post(&self, url: Url, body: &Value) -> Result<Value, HttpError> {
        self.handle(Method::Post, &url, &[], Some(body)).await
    }

    async fn delete(&self, url: Url) -> Result<Value, HttpError> {
        self.handle(Method::Delete, &url, &[], None).await
    }
}

fn status_error(status: StatusCode) -> HttpError {
    HttpError::HttpStatus {
        status,
        body_preview: String::new(),
        content_type: None,
    }
}

/// A [`Client`] over `mock` with the production endpoints.
pub fn test_client(mock: &MockTransport) -> Client {
    Client::new(Arc::new(mock.clone()), Arc::new(Endpoints::default()))
}

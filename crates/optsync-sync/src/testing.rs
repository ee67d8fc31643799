//! Scripted in-memory transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use optsync_api::{AdminApi, ApiError, ApiRequest, ApiResponse, ApiResult, Method, Transport};
use serde_json::Value;

#[derive(Clone)]
enum Reply {
    Respond(ApiResponse),
    Fail(String),
}

/// Answers requests from per-route reply queues and records every request.
///
/// Routes are keyed by method and unencoded path (query excluded). The last
/// reply queued for a route repeats; unknown routes answer 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, response: ApiResponse) -> &Self {
        self.push(method, path, Reply::Respond(response))
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, Reply::Fail(message.to_string()))
    }

    fn push(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path() == path)
            .count()
    }

    /// Bodies of every request sent to a route, in order.
    pub fn bodies(&self, method: Method, path: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path() == path)
            .filter_map(|r| r.body.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn request(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        self.calls.lock().unwrap().push(request.clone());

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&(request.method.clone(), request.path())) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(ApiError::Transport(message)),
            None => Ok(ApiResponse::failed(404, "not found")),
        }
    }
}

pub fn fake_api() -> AdminApi<FakeTransport> {
    AdminApi::new(FakeTransport::new())
}

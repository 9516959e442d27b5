//! Common test utilities

use async_trait::async_trait;
use review_watcher::api::{ApiClient, ApiError, ApiReply};
use review_watcher::notifications::{ChannelError, ChannelResult, DeliveryStatus, Notifier};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Approved verdict text
#[allow(dead_code)]
pub const APPROVED: &str = "Работа проверена: ревьюеру всё понравилось. Ура!";

/// 200 reply with the given homeworks and server date
#[allow(dead_code)]
pub fn reply(homeworks: Vec<Value>, current_date: i64) -> Result<ApiReply, ApiError> {
    let body = json!({ "homeworks": homeworks, "current_date": current_date });
    Ok(ApiReply::new(200, body.to_string()))
}

/// Homework entry
#[allow(dead_code)]
pub fn homework(name: &str, status: &str) -> Value {
    json!({ "homework_name": name, "status": status })
}

/// Client that replays a script of replies
///
/// The last entry repeats once the script runs out. Every requested
/// `from_date` is recorded.
#[allow(dead_code)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<ApiReply, ApiError>>>,
    last: Mutex<Option<Result<ApiReply, ApiError>>>,
    requests: Arc<Mutex<Vec<i64>>>,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new(script: Vec<Result<ApiReply, ApiError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the recorded `from_date` values
    pub fn requests(&self) -> Arc<Mutex<Vec<i64>>> {
        Arc::clone(&self.requests)
    }
}

#[allow(dead_code)]
fn clone_result(result: &Result<ApiReply, ApiError>) -> Result<ApiReply, ApiError> {
    match result {
        Ok(reply) => Ok(reply.clone()),
        Err(ApiError::Transport { message, timeout }) => Err(ApiError::Transport {
            message: message.clone(),
            timeout: *timeout,
        }),
        Err(ApiError::WrongStatus { status }) => Err(ApiError::WrongStatus { status: *status }),
        Err(ApiError::Schema(err)) => Err(ApiError::Schema(err.clone())),
    }
}

#[async_trait]
impl ApiClient for ScriptedClient {
    async fn fetch(&self, from_date: i64) -> Result<ApiReply, ApiError> {
        self.requests.lock().unwrap().push(from_date);

        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(result) => {
                *last = Some(clone_result(&result));
                result
            }
            None => match last.as_ref() {
                Some(result) => clone_result(result),
                None => panic!("ScriptedClient called with an empty script"),
            },
        }
    }
}

/// Notifier that records every message it is asked to send
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that records messages and then fails every delivery
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str) -> ChannelResult<DeliveryStatus> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(ChannelError::Status {
                status: 502,
                body: "Bad Gateway".to_string(),
            });
        }
        Ok(DeliveryStatus::success("recording"))
    }
}

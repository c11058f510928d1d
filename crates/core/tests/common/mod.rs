#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use sentiscope_core::{
    Result, ScopeError,
    client::{Backend, Endpoint, check_response},
};
use serde_json::{Value, json};
use tokio::sync::Notify;

pub enum Reply {
    Json(u16, Value),
    Unreachable,
    /// Never answers; only cancellation gets the caller out.
    Hang,
}

/// Backend that answers from a per-endpoint script and records every call.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<HashMap<Endpoint, VecDeque<Reply>>>,
    calls: Mutex<Vec<(Endpoint, Value)>>,
    pub requested: Notify,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, endpoint: Endpoint, body: Value) -> Self {
        self.push(endpoint, Reply::Json(200, body))
    }

    pub fn reply_status(self, endpoint: Endpoint, status: u16, body: Value) -> Self {
        self.push(endpoint, Reply::Json(status, body))
    }

    pub fn unreachable(self, endpoint: Endpoint) -> Self {
        self.push(endpoint, Reply::Unreachable)
    }

    pub fn hang(self, endpoint: Endpoint) -> Self {
        self.push(endpoint, Reply::Hang)
    }

    pub fn calls(&self) -> Vec<(Endpoint, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls().into_iter().map(|(e, _)| e).collect()
    }

    fn push(self, endpoint: Endpoint, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(reply);
        self
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn request(&self, endpoint: Endpoint, payload: Value) -> Result<Value> {
        self.calls.lock().unwrap().push((endpoint, payload));
        self.requested.notify_one();

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Json(status, body)) => check_response(endpoint, status, body),
            Some(Reply::Unreachable) | None => Err(ScopeError::Network {
                endpoint: endpoint.path().to_string(),
                reason: "connection refused".to_string(),
            }),
            Some(Reply::Hang) => std::future::pending().await,
        }
    }
}

pub fn positive_sentiment() -> Value {
    json!({
        "success": true,
        "sentiment": {
            "label": "positive",
            "confidence": 0.92,
            "scores": {"positive": 0.8, "neutral": 0.15, "negative": 0.05}
        }
    })
}

pub fn short_summary() -> Value {
    json!({
        "success": true,
        "summary": {
            "summary": "Markets rallied.",
            "original_length": 120,
            "summary_length": 30,
            "compression_ratio": 0.25
        }
    })
}

//! Shared fixtures: an in-memory store and a canned HTTP transport.
#![allow(dead_code)]

use crimestat_core::{
    config::IngestConfig,
    error::{IngestError, IngestResult},
    http::HttpTransport,
    store::IngestStore,
};
use std::cell::RefCell;
use std::collections::HashMap;

pub const BASE_URL: &str = "http://stub.local";

pub fn cyber_url() -> String  { format!("{BASE_URL}/cyber-scam") }
pub fn voice_url() -> String  { format!("{BASE_URL}/voice-phishing") }
pub fn travel_url() -> String { format!("{BASE_URL}/travel") }

pub fn config() -> IngestConfig {
    IngestConfig::for_base_url(BASE_URL)
}

pub fn store() -> IngestStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = IngestStore::in_memory().expect("open in-memory store");
    store.migrate().expect("migrate");
    store
}

enum Reply {
    Body(String),
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct Call {
    pub url:   String,
    pub query: Vec<(String, String)>,
}

impl Call {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Replies per URL; unknown URLs answer 404.
#[derive(Default)]
pub struct CannedTransport {
    replies:   HashMap<String, Reply>,
    pub calls: RefCell<Vec<Call>>,
}

impl CannedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: impl Into<String>) -> Self {
        self.replies.insert(url.to_string(), Reply::Body(body.into()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.replies.insert(url.to_string(), Reply::Status(status));
        self
    }

    pub fn last_call(&self) -> Call {
        self.calls.borrow().last().cloned().expect("at least one call")
    }
}

impl HttpTransport for CannedTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> IngestResult<String> {
        self.calls.borrow_mut().push(Call {
            url:   url.to_string(),
            query: query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        });
        match self.replies.get(url) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(IngestError::HttpStatus {
                status: *status,
                url:    url.to_string(),
            }),
            None => Err(IngestError::HttpStatus { status: 404, url: url.to_string() }),
        }
    }
}

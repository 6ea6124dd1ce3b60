#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use hubauth::api::ApiClientFactory;
use hubauth::auth::{AuthError, BrowserAuth};
use hubauth::config::{CredentialStore, StoreError, OAUTH_TOKEN_KEY};
use hubauth::login::{LoginEvent, LoginReporter};
use hubauth::prompt::{PromptError, Prompter};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Set {
        host: String,
        key: String,
        value: String,
    },
    Commit,
}

impl StoreCall {
    pub fn set(host: &str, key: &str, value: &str) -> Self {
        Self::Set {
            host: host.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// In-memory store that records every call and can refuse to commit.
#[derive(Default)]
pub struct RecordingStore {
    staged: Mutex<HashMap<(String, String), String>>,
    committed: Mutex<HashMap<(String, String), String>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_commits: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_commits() -> Self {
        Self {
            fail_commits: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().expect("store lock poisoned").clone()
    }

    pub fn committed(&self, host: &str, key: &str) -> Option<String> {
        self.committed
            .lock()
            .expect("store lock poisoned")
            .get(&(host.to_string(), key.to_string()))
            .cloned()
    }
}

impl CredentialStore for RecordingStore {
    fn get(&self, host: &str, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .staged
            .lock()
            .expect("store lock poisoned")
            .get(&(host.to_string(), key.to_string()))
            .cloned())
    }

    fn set(&self, host: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.calls
            .lock()
            .expect("store lock poisoned")
            .push(StoreCall::set(host, key, value));
        if host.trim().is_empty() {
            return Err(StoreError::InvalidHost(host.to_string()));
        }
        self.staged
            .lock()
            .expect("store lock poisoned")
            .insert((host.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    fn commit(&self) -> Result<(), StoreError> {
        self.calls
            .lock()
            .expect("store lock poisoned")
            .push(StoreCall::Commit);
        if self.fail_commits {
            return Err(StoreError::Io("disk full".to_string()));
        }
        let staged = self.staged.lock().expect("store lock poisoned").clone();
        *self.committed.lock().expect("store lock poisoned") = staged;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Prompter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Answer {
    Select(usize),
    Text(String),
    Cancel,
}

impl Answer {
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Replays canned answers in order and records each question asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
    required: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
            required: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().expect("prompter lock poisoned").clone()
    }

    /// Text prompts that refused a blank answer, in order.
    pub fn required(&self) -> Vec<String> {
        self.required.lock().expect("prompter lock poisoned").clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().expect("prompter lock poisoned").len()
    }

    fn next(&self, message: &str) -> Answer {
        self.asked
            .lock()
            .expect("prompter lock poisoned")
            .push(message.to_string());
        self.answers
            .lock()
            .expect("prompter lock poisoned")
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {message}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, message: &str, options: &[&str]) -> Result<usize, PromptError> {
        match self.next(message) {
            Answer::Select(index) => {
                assert!(index < options.len(), "{message}: no option {index} in {options:?}");
                Ok(index)
            }
            Answer::Cancel => Err(PromptError::Cancelled),
            other => panic!("{message}: expected a selection, scripted {other:?}"),
        }
    }

    fn input(&self, message: &str, required: bool) -> Result<String, PromptError> {
        if required {
            self.required
                .lock()
                .expect("prompter lock poisoned")
                .push(message.to_string());
        }
        match self.next(message) {
            Answer::Text(value) => Ok(value),
            Answer::Cancel => Err(PromptError::Cancelled),
            other => panic!("{message}: expected text, scripted {other:?}"),
        }
    }

    fn password(&self, message: &str, required: bool) -> Result<String, PromptError> {
        self.input(message, required)
    }
}

// ---------------------------------------------------------------------------
// Browser flow
// ---------------------------------------------------------------------------

/// Browser flow that either commits a fixed token or fails.
pub struct FakeBrowser {
    token: Option<String>,
    calls: AtomicUsize,
}

impl FakeBrowser {
    pub fn granting(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn denying() -> Self {
        Self {
            token: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserAuth for FakeBrowser {
    async fn authenticate(
        &self,
        store: &dyn CredentialStore,
        hostname: &str,
    ) -> Result<(), AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.token {
            Some(token) => {
                store.set(hostname, OAUTH_TOKEN_KEY, token)?;
                store.commit()?;
                Ok(())
            }
            None => Err(AuthError::AccessDenied),
        }
    }
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingReporter {
    pub events: Vec<LoginEvent>,
}

impl LoginReporter for RecordingReporter {
    fn report(&mut self, event: &LoginEvent) {
        self.events.push(event.clone());
    }
}

// ---------------------------------------------------------------------------
// Remote host
// ---------------------------------------------------------------------------

pub fn factory_for(server: &MockServer) -> ApiClientFactory {
    ApiClientFactory::default().with_api_url(server.uri())
}

/// Serve `GET /user` with the given granted scopes and login.
pub async fn mount_user(server: &MockServer, scopes: &str, login: &str) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-OAuth-Scopes", scopes)
                .set_body_json(json!({ "login": login, "id": 1 })),
        )
        .mount(server)
        .await;
}

pub async fn user_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.url.path() == "/user")
        .count()
}

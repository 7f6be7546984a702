// HTTP client for the persona test endpoint

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::abort::AbortHandle;
use crate::config::ClientConfig;
use crate::error::StreamError;
use crate::reader::read_event_stream;
use crate::streaming::{StreamEvent, StreamOutcome};
use crate::traits::{PersonaTester, StreamSink};

const CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrftoken");
const STATUS_FALLBACK_MESSAGE: &str = "Failed to test persona";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Request body for a persona test run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPersonaInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub chat_history: Vec<ChatTurn>,
}

impl TestPersonaInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn persona_id(mut self, id: impl Into<String>) -> Self {
        self.persona_id = Some(id.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn model_id(mut self, id: i64) -> Self {
        self.model_id = Some(id);
        self
    }

    pub fn history(mut self, turns: Vec<ChatTurn>) -> Self {
        self.chat_history = turns;
        self
    }
}

enum HandleState {
    Running(JoinHandle<StreamOutcome>),
    Finished(StreamOutcome),
}

/// Handle to one in-flight persona test stream.
///
/// Dropping the handle does not cancel the stream; call [`StreamHandle::abort`].
pub struct StreamHandle {
    abort: AbortHandle,
    state: HandleState,
}

impl StreamHandle {
    fn running(abort: AbortHandle, task: JoinHandle<StreamOutcome>) -> Self {
        Self {
            abort,
            state: HandleState::Running(task),
        }
    }

    fn finished(abort: AbortHandle, outcome: StreamOutcome) -> Self {
        Self {
            abort,
            state: HandleState::Finished(outcome),
        }
    }

    /// Stop the read loop. No further callbacks fire, `error` included.
    pub fn abort(&self) {
        self.abort.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Running(task) => task.is_finished(),
            HandleState::Finished(_) => true,
        }
    }

    /// Wait for the read loop to end.
    pub async fn join(self) -> StreamOutcome {
        match self.state {
            HandleState::Finished(outcome) => outcome,
            HandleState::Running(task) => match task.await {
                Ok(outcome) => outcome,
                Err(e) => StreamOutcome::Failed(format!("Stream task failed: {}", e)),
            },
        }
    }
}

/// Persona test client (HTTP direct)
pub struct PersonaClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl PersonaClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.csrf_token {
            headers.insert(
                CSRF_HEADER,
                HeaderValue::from_str(token).context("Invalid CSRF token format")?,
            );
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            endpoint: config.persona_test_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Start a persona test run.
    ///
    /// Resolves once the response headers arrive; the body is then read on
    /// a background task. Failures before streaming starts are delivered to
    /// `sink` and produce an already-finished handle.
    pub async fn test_persona<S>(&self, input: TestPersonaInput, mut sink: S) -> StreamHandle
    where
        S: StreamSink + 'static,
    {
        let (abort, mut signal) = AbortHandle::pair();

        let response = match self.http_client.post(&self.endpoint).json(&input).send().await {
            Ok(response) => response,
            Err(e) => return StreamHandle::finished(abort, report(&mut sink, e.into())),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = if body.trim().is_empty() {
                STATUS_FALLBACK_MESSAGE.to_string()
            } else {
                body
            };
            let error = StreamError::Status {
                status: status.as_u16(),
                body,
            };
            return StreamHandle::finished(abort, report(&mut sink, error));
        }

        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return StreamHandle::finished(abort, report(&mut sink, StreamError::MissingBody));
        }

        tracing::info!(endpoint = %self.endpoint, "persona test stream started");

        let task = tokio::spawn(async move {
            let outcome = read_event_stream(response.bytes_stream(), &mut sink, &mut signal).await;
            if outcome.is_completed() {
                tracing::info!("persona test stream finished");
            } else {
                tracing::info!(?outcome, "persona test stream ended early");
            }
            outcome
        });

        StreamHandle::running(abort, task)
    }
}

#[async_trait]
impl PersonaTester for PersonaClient {
    async fn test_persona<S>(&self, input: TestPersonaInput, sink: S) -> StreamHandle
    where
        S: StreamSink + 'static,
    {
        PersonaClient::test_persona(self, input, sink).await
    }
}

fn report<S: StreamSink + ?Sized>(sink: &mut S, error: StreamError) -> StreamOutcome {
    let message = error.to_string();
    tracing::warn!(error = %message, "persona test request failed");
    sink.dispatch(StreamEvent::error(message.clone()));
    StreamOutcome::Failed(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_serialization_skips_empty_fields() {
        let input = TestPersonaInput::new("Hi").persona_id("42");

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({"personaId": "42", "message": "Hi"}));
    }

    #[test]
    fn test_input_serialization_with_history() {
        let input = TestPersonaInput::new("And now?")
            .prompt("You are terse")
            .model_id(7)
            .history(vec![ChatTurn {
                role: ChatRole::User,
                content: "Hello".to_string(),
            }]);

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["modelId"], 7);
        assert_eq!(json["chatHistory"][0]["role"], "user");
        assert_eq!(json["prompt"], "You are terse");
    }

    #[test]
    fn test_client_uses_configured_endpoint() {
        let config = ClientConfig::default().with_base_url("http://localhost:9000/");
        let client = PersonaClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9000/personas/test/");
    }

    #[test]
    fn test_report_reaches_dispatch_only_sinks() {
        let mut events: Vec<StreamEvent> = Vec::new();

        let outcome = report(&mut events, StreamError::MissingBody);

        assert_eq!(outcome, StreamOutcome::Failed("No response body".to_string()));
        assert_eq!(events, vec![StreamEvent::error("No response body")]);
    }

    #[test]
    fn test_invalid_csrf_token_is_rejected() {
        let config = ClientConfig::default().with_csrf_token("bad\ntoken");
        assert!(PersonaClient::new(&config).is_err());
    }
}

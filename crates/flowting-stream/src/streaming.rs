use serde::{Deserialize, Serialize};

/// Model information announced at the start of a persona test stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub model_id: i64,
    pub model_name: String,
    pub provider: String,
}

/// Final payload of a successful stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub response: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// One decoded `event:`/`data:` frame of the persona test stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Metadata(ModelMetadata),

    Start,

    /// Incremental response text; callers append it to the running response.
    Chunk {
        delta: String,
    },

    End,

    /// Terminal success.
    Done(CompletionSummary),

    /// Terminal failure, either sent by the backend or raised locally.
    Error {
        message: String,
    },
}

impl StreamEvent {
    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            message: message.into(),
        }
    }

    /// Wire name used on the `event:` line.
    pub fn event_type(&self) -> &'static str {
        match self {
            StreamEvent::Metadata(_) => "metadata",
            StreamEvent::Start => "start",
            StreamEvent::Chunk { .. } => "chunk",
            StreamEvent::End => "end",
            StreamEvent::Done(_) => "done",
            StreamEvent::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done(_) | StreamEvent::Error { .. })
    }
}

/// How a read loop finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The byte stream reported end of data.
    Completed,
    /// The caller aborted; nothing was reported to the sink.
    Aborted,
    /// A failure was reported to the sink's `error` callback.
    Failed(String),
}

impl StreamOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StreamOutcome::Completed)
    }
}

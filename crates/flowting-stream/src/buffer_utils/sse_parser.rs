use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::streaming::{CompletionSummary, ModelMetadata, StreamEvent};

const EVENT_PREFIX: &str = "event: ";
const DATA_PREFIX: &str = "data: ";

/// A raw `event:`/`data:` pair whose data parsed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamFrame {
    pub event_type: String,
    pub payload: Value,
}

/// Strategy for turning raw frames into typed events.
pub trait FrameDecoder: Send {
    /// Returns None for frames this decoder does not understand.
    fn decode(&self, frame: StreamFrame) -> Option<StreamEvent>;
}

/// Decoder for the persona test endpoint's event vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonaFrameDecoder;

#[derive(serde::Deserialize)]
struct ChunkPayload {
    delta: String,
}

#[derive(serde::Deserialize)]
struct ErrorPayload {
    error: String,
}

fn typed<T: DeserializeOwned>(payload: Value) -> Option<T> {
    serde_json::from_value(payload).ok()
}

impl FrameDecoder for PersonaFrameDecoder {
    fn decode(&self, frame: StreamFrame) -> Option<StreamEvent> {
        match frame.event_type.as_str() {
            "metadata" => typed::<ModelMetadata>(frame.payload).map(StreamEvent::Metadata),
            "start" => Some(StreamEvent::Start),
            "chunk" => typed::<ChunkPayload>(frame.payload)
                .map(|p| StreamEvent::Chunk { delta: p.delta }),
            "end" => Some(StreamEvent::End),
            "done" => typed::<CompletionSummary>(frame.payload).map(StreamEvent::Done),
            "error" => typed::<ErrorPayload>(frame.payload).map(|p| StreamEvent::error(p.error)),
            _ => None,
        }
    }
}

/// Line-level state machine for the event stream.
///
/// Holds the event type announced by the last `event:` line until a data
/// line under it is dispatched. Blank lines carry no meaning.
pub struct SseLineParser<D = PersonaFrameDecoder> {
    decoder: D,
    pending_event_type: Option<String>,
}

impl SseLineParser<PersonaFrameDecoder> {
    pub fn new() -> Self {
        Self::with_decoder(PersonaFrameDecoder)
    }
}

impl Default for SseLineParser<PersonaFrameDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: FrameDecoder> SseLineParser<D> {
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            pending_event_type: None,
        }
    }

    pub fn pending_event_type(&self) -> Option<&str> {
        self.pending_event_type.as_deref()
    }

    /// Feed one complete line (terminator already stripped).
    pub fn feed_line(&mut self, line: &str) -> Option<StreamEvent> {
        if let Some(name) = line.strip_prefix(EVENT_PREFIX) {
            self.pending_event_type = Some(name.trim().to_string());
            return None;
        }

        let data = line.strip_prefix(DATA_PREFIX)?;

        let Some(event_type) = self.pending_event_type.clone() else {
            tracing::debug!("data line without a preceding event line, dropped");
            return None;
        };

        let payload: Value = match serde_json::from_str(data) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(event_type = %event_type, error = %e, "malformed data line, dropped");
                return None;
            }
        };

        let frame = StreamFrame {
            event_type: event_type.clone(),
            payload,
        };

        match self.decoder.decode(frame) {
            Some(event) => {
                self.pending_event_type = None;
                Some(event)
            }
            None => {
                tracing::debug!(event_type = %event_type, "unrecognized frame, dropped");
                None
            }
        }
    }
}

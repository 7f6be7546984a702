use std::sync::{Arc, Mutex, MutexGuard};

use crate::streaming::{CompletionSummary, ModelMetadata};
use crate::traits::StreamSink;

/// Everything a persona test stream has produced so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccumulatedResponse {
    pub metadata: Option<ModelMetadata>,
    /// Concatenation of every chunk delta, in arrival order.
    pub text: String,
    pub started: bool,
    pub ended: bool,
    pub summary: Option<CompletionSummary>,
    pub error: Option<String>,
}

impl AccumulatedResponse {
    /// The backend's final response when known, else the running text.
    pub fn final_text(&self) -> &str {
        match &self.summary {
            Some(summary) => &summary.response,
            None => &self.text,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.summary.is_some() || self.error.is_some()
    }
}

/// Sink that builds up the running response.
///
/// Clones share state, so one clone can be handed to the stream while
/// another is kept to read [`ResponseAccumulator::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct ResponseAccumulator {
    state: Arc<Mutex<AccumulatedResponse>>,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> AccumulatedResponse {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, AccumulatedResponse> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StreamSink for ResponseAccumulator {
    fn on_metadata(&mut self, metadata: ModelMetadata) {
        self.lock().metadata = Some(metadata);
    }

    fn on_start(&mut self) {
        self.lock().started = true;
    }

    fn on_chunk(&mut self, delta: String) {
        self.lock().text.push_str(&delta);
    }

    fn on_end(&mut self) {
        self.lock().ended = true;
    }

    fn on_done(&mut self, summary: CompletionSummary) {
        self.lock().summary = Some(summary);
    }

    fn on_error(&mut self, message: String) {
        self.lock().error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::StreamEvent;

    #[test]
    fn test_accumulates_chunks() {
        let accumulator = ResponseAccumulator::new();
        let mut sink = accumulator.clone();

        sink.dispatch(StreamEvent::Start);
        sink.dispatch(StreamEvent::Chunk {
            delta: "Hel".to_string(),
        });
        sink.dispatch(StreamEvent::Chunk {
            delta: "lo".to_string(),
        });

        let snapshot = accumulator.snapshot();
        assert!(snapshot.started);
        assert_eq!(snapshot.text, "Hello");
        assert_eq!(snapshot.final_text(), "Hello");
        assert!(!snapshot.is_terminal());
    }

    #[test]
    fn test_final_text_prefers_summary() {
        let mut accumulator = ResponseAccumulator::new();

        accumulator.on_chunk("partial".to_string());
        accumulator.on_done(CompletionSummary {
            response: "complete".to_string(),
            input_tokens: 1,
            output_tokens: 2,
        });

        let snapshot = accumulator.snapshot();
        assert_eq!(snapshot.final_text(), "complete");
        assert!(snapshot.is_terminal());
    }
}

pub mod abort;
pub mod accumulator;
pub mod buffer_utils;
pub mod client;
pub mod config;
pub mod error;
pub mod reader;
pub mod streaming;
pub mod traits;

pub use abort::{AbortHandle, AbortSignal};
pub use accumulator::{AccumulatedResponse, ResponseAccumulator};
pub use buffer_utils::{FrameDecoder, LineBuffer, PersonaFrameDecoder, SseLineParser, StreamFrame};
pub use client::{ChatRole, ChatTurn, PersonaClient, StreamHandle, TestPersonaInput};
pub use config::{ClientConfig, LoggingConfig};
pub use error::StreamError;
pub use reader::{read_event_stream, EventStreamReader};
pub use streaming::{CompletionSummary, ModelMetadata, StreamEvent, StreamOutcome};
pub use traits::{PersonaTester, StreamCallbacks, StreamSink};

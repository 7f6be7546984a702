use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::client::{StreamHandle, TestPersonaInput};
use crate::streaming::{CompletionSummary, ModelMetadata, StreamEvent};

/// Receiver of decoded stream events, one method per event kind.
///
/// Every method defaults to a no-op so implementors only handle what
/// they care about. Methods run on the read loop, between reads.
pub trait StreamSink: Send {
    fn on_metadata(&mut self, _metadata: ModelMetadata) {}

    fn on_start(&mut self) {}

    fn on_chunk(&mut self, _delta: String) {}

    fn on_end(&mut self) {}

    fn on_done(&mut self, _summary: CompletionSummary) {}

    fn on_error(&mut self, _message: String) {}

    /// Route a tagged event to the matching method.
    fn dispatch(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Metadata(metadata) => self.on_metadata(metadata),
            StreamEvent::Start => self.on_start(),
            StreamEvent::Chunk { delta } => self.on_chunk(delta),
            StreamEvent::End => self.on_end(),
            StreamEvent::Done(summary) => self.on_done(summary),
            StreamEvent::Error { message } => self.on_error(message),
        }
    }
}

impl<S: StreamSink + ?Sized> StreamSink for Box<S> {
    fn on_metadata(&mut self, metadata: ModelMetadata) {
        (**self).on_metadata(metadata)
    }

    fn on_start(&mut self) {
        (**self).on_start()
    }

    fn on_chunk(&mut self, delta: String) {
        (**self).on_chunk(delta)
    }

    fn on_end(&mut self) {
        (**self).on_end()
    }

    fn on_done(&mut self, summary: CompletionSummary) {
        (**self).on_done(summary)
    }

    fn on_error(&mut self, message: String) {
        (**self).on_error(message)
    }

    fn dispatch(&mut self, event: StreamEvent) {
        (**self).dispatch(event)
    }
}

/// Forwards every event into a channel; a closed receiver is ignored.
impl StreamSink for mpsc::UnboundedSender<StreamEvent> {
    fn dispatch(&mut self, event: StreamEvent) {
        if self.send(event).is_err() {
            tracing::debug!("stream event receiver dropped");
        }
    }
}

/// Records events in arrival order.
impl StreamSink for Vec<StreamEvent> {
    fn dispatch(&mut self, event: StreamEvent) {
        self.push(event);
    }
}

type Handler<T> = Box<dyn FnMut(T) + Send>;

/// Closure-based sink with an optional handler per event kind.
#[derive(Default)]
pub struct StreamCallbacks {
    on_metadata: Option<Handler<ModelMetadata>>,
    on_start: Option<Handler<()>>,
    on_chunk: Option<Handler<String>>,
    on_end: Option<Handler<()>>,
    on_done: Option<Handler<CompletionSummary>>,
    on_error: Option<Handler<String>>,
}

impl StreamCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(mut self, f: impl FnMut(ModelMetadata) + Send + 'static) -> Self {
        self.on_metadata = Some(Box::new(f));
        self
    }

    pub fn start(mut self, mut f: impl FnMut() + Send + 'static) -> Self {
        self.on_start = Some(Box::new(move |()| f()));
        self
    }

    pub fn chunk(mut self, f: impl FnMut(String) + Send + 'static) -> Self {
        self.on_chunk = Some(Box::new(f));
        self
    }

    pub fn end(mut self, mut f: impl FnMut() + Send + 'static) -> Self {
        self.on_end = Some(Box::new(move |()| f()));
        self
    }

    pub fn done(mut self, f: impl FnMut(CompletionSummary) + Send + 'static) -> Self {
        self.on_done = Some(Box::new(f));
        self
    }

    pub fn error(mut self, f: impl FnMut(String) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl StreamSink for StreamCallbacks {
    fn on_metadata(&mut self, metadata: ModelMetadata) {
        if let Some(f) = self.on_metadata.as_mut() {
            f(metadata);
        }
    }

    fn on_start(&mut self) {
        if let Some(f) = self.on_start.as_mut() {
            f(());
        }
    }

    fn on_chunk(&mut self, delta: String) {
        if let Some(f) = self.on_chunk.as_mut() {
            f(delta);
        }
    }

    fn on_end(&mut self) {
        if let Some(f) = self.on_end.as_mut() {
            f(());
        }
    }

    fn on_done(&mut self, summary: CompletionSummary) {
        if let Some(f) = self.on_done.as_mut() {
            f(summary);
        }
    }

    fn on_error(&mut self, message: String) {
        if let Some(f) = self.on_error.as_mut() {
            f(message);
        }
    }
}

/// Client for the persona test endpoint.
///
/// The returned handle is live as soon as this resolves; every failure,
/// including transport errors, is delivered to the sink.
#[async_trait]
pub trait PersonaTester: Send + Sync {
    async fn test_persona<S>(&self, input: TestPersonaInput, sink: S) -> StreamHandle
    where
        S: StreamSink + 'static;
}

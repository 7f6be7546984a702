use std::fmt::Display;

use futures::{Stream, StreamExt};

use crate::abort::AbortSignal;
use crate::buffer_utils::{FrameDecoder, LineBuffer, PersonaFrameDecoder, SseLineParser};
use crate::error::{Result, StreamError};
use crate::streaming::{StreamEvent, StreamOutcome};
use crate::traits::StreamSink;

const INITIAL_CAPACITY: usize = 4096;

/// Incremental decoder for one streaming session.
///
/// Owns the undecoded tail of the byte stream and the pending event type.
/// Once a terminal event (`done` or `error`) has been dispatched, further
/// input is ignored.
pub struct EventStreamReader<D = PersonaFrameDecoder> {
    buffer: LineBuffer,
    parser: SseLineParser<D>,
    terminal: Option<StreamOutcome>,
}

impl EventStreamReader<PersonaFrameDecoder> {
    pub fn new() -> Self {
        Self::with_decoder(PersonaFrameDecoder)
    }
}

impl Default for EventStreamReader<PersonaFrameDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: FrameDecoder> EventStreamReader<D> {
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            buffer: LineBuffer::with_capacity(INITIAL_CAPACITY),
            parser: SseLineParser::with_decoder(decoder),
            terminal: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.terminal.is_some()
    }

    /// Decode one chunk of bytes, dispatching every complete frame.
    ///
    /// Frames completed before a decode failure are still dispatched.
    pub fn feed<S>(&mut self, bytes: &[u8], sink: &mut S) -> Result<()>
    where
        S: StreamSink + ?Sized,
    {
        if self.terminal.is_some() {
            return Ok(());
        }

        self.buffer.extend(bytes);

        while let Some(line) = self.buffer.next_line() {
            let line = line?;
            let Some(event) = self.parser.feed_line(&line) else {
                continue;
            };

            tracing::trace!(event_type = event.event_type(), "dispatching stream event");
            let outcome = event.is_terminal().then(|| match &event {
                StreamEvent::Error { message } => StreamOutcome::Failed(message.clone()),
                _ => StreamOutcome::Completed,
            });
            sink.dispatch(event);

            if outcome.is_some() {
                self.terminal = outcome;
                self.buffer.discard_tail();
                break;
            }
        }

        Ok(())
    }

    /// Drive the reader over a byte stream until it ends, fails, or the
    /// session is aborted.
    ///
    /// An abort stops silently. Any other failure is reported once through
    /// the sink's `error` callback.
    pub async fn run<St, B, E, S>(
        mut self,
        stream: St,
        sink: &mut S,
        signal: &mut AbortSignal,
    ) -> StreamOutcome
    where
        St: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
        S: StreamSink + ?Sized,
    {
        match self.pump(stream, sink, signal).await {
            Ok(()) => self.terminal.take().unwrap_or(StreamOutcome::Completed),
            Err(e) if e.is_aborted() => {
                tracing::debug!("stream aborted by caller");
                self.buffer.discard_tail();
                StreamOutcome::Aborted
            }
            Err(e) => fail(sink, e),
        }
    }

    /// Read until end of stream or a terminal event.
    async fn pump<St, B, E, S>(&mut self, stream: St, sink: &mut S, signal: &mut AbortSignal) -> Result<()>
    where
        St: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
        S: StreamSink + ?Sized,
    {
        let mut byte_chunks = Box::pin(stream);

        loop {
            if signal.is_aborted() {
                return Err(StreamError::Aborted);
            }

            let next = tokio::select! {
                biased;
                _ = signal.aborted() => return Err(StreamError::Aborted),
                next = byte_chunks.next() => next,
            };

            let bytes = match next {
                Some(Ok(bytes)) => bytes,
                Some(Err(e)) => return Err(StreamError::Transport(e.to_string())),
                None => break,
            };

            self.feed(bytes.as_ref(), sink)?;

            if let Some(outcome) = &self.terminal {
                tracing::debug!(?outcome, "stream reached terminal event");
                return Ok(());
            }
        }

        let dropped = self.buffer.discard_tail();
        if dropped > 0 {
            tracing::debug!(bytes = dropped, "discarded unterminated tail at end of stream");
        }
        Ok(())
    }
}

fn fail<S: StreamSink + ?Sized>(sink: &mut S, error: StreamError) -> StreamOutcome {
    let message = error.to_string();
    tracing::warn!(error = %message, "stream failed");
    sink.dispatch(StreamEvent::error(message.clone()));
    StreamOutcome::Failed(message)
}

/// Read a persona test event stream into `sink`.
pub async fn read_event_stream<St, B, E, S>(
    stream: St,
    sink: &mut S,
    signal: &mut AbortSignal,
) -> StreamOutcome
where
    St: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
    S: StreamSink + ?Sized,
{
    EventStreamReader::new().run(stream, sink, signal).await
}

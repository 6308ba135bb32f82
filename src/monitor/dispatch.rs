//! Frame-driven drain and dispatch.
//!
//! The host calls [`Dispatcher::drain_once`] once per tick. Each call takes
//! at most one event from the handoff slot and hands it to the sink. It
//! never waits for an event to arrive.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use super::events::Event;
use super::slot::HandoffSlot;
use crate::telemetry::metrics;
use crate::{Error, Result};

/// Name every dispatched event carries.
pub const EVENT_NAME: &str = "directoryMonitor";

/// An event as delivered to a sink: the event name plus the event fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchedEvent {
    name: &'static str,
    #[serde(flatten)]
    event: Event,
}

impl DispatchedEvent {
    /// Wrap `event` under [`EVENT_NAME`].
    #[must_use]
    pub const fn new(event: Event) -> Self {
        Self {
            name: EVENT_NAME,
            event,
        }
    }

    /// Event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The delivered event.
    #[must_use]
    pub const fn event(&self) -> &Event {
        &self.event
    }

    /// Unwrap into the delivered event.
    #[must_use]
    pub fn into_event(self) -> Event {
        self.event
    }
}

/// Receiver of dispatched events.
pub trait EventSink {
    /// Deliver one event.
    ///
    /// # Errors
    ///
    /// Any error is reported to the caller of `drain_once` as
    /// `SinkDeliveryFailed`. The event is not retried.
    fn deliver(&mut self, event: &DispatchedEvent) -> Result<()>;
}

impl<F> EventSink for F
where
    F: FnMut(&DispatchedEvent) -> Result<()>,
{
    fn deliver(&mut self, event: &DispatchedEvent) -> Result<()> {
        self(event)
    }
}

/// Sink writing each event as one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Create a sink over `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn deliver(&mut self, event: &DispatchedEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Whether a sink call is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    /// No dispatch in progress.
    #[default]
    Idle,
    /// The sink is being invoked.
    Dispatching,
}

/// Consumer side of the relay.
pub struct Dispatcher<S> {
    slot: Arc<HandoffSlot>,
    sink: S,
    state: DispatchState,
}

// Sinks are usually closures, so `S: Debug` is not required.
impl<S> fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.slot.is_pending())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<S: EventSink> Dispatcher<S> {
    /// Create a dispatcher draining `slot` into `sink`.
    pub const fn new(slot: Arc<HandoffSlot>, sink: S) -> Self {
        Self {
            slot,
            sink,
            state: DispatchState::Idle,
        }
    }

    /// Take the pending event, if any, and deliver it.
    ///
    /// Returns `Ok(None)` without touching the sink when nothing is
    /// pending. The taken event is consumed whether or not delivery
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns `SinkDeliveryFailed` if the sink fails. The next call
    /// proceeds normally.
    pub fn drain_once(&mut self) -> Result<Option<DispatchedEvent>> {
        let Some(event) = self.slot.try_take() else {
            return Ok(None);
        };

        let dispatched = DispatchedEvent::new(event);
        self.state = DispatchState::Dispatching;
        let outcome = self.sink.deliver(&dispatched);
        self.state = DispatchState::Idle;

        match outcome {
            Ok(()) => {
                metrics::EVENTS_DISPATCHED.inc();
                tracing::debug!(
                    watch_id = %dispatched.event().watch_id(),
                    action = %dispatched.event().action(),
                    path = dispatched.event().file_path(),
                    "Dispatched event"
                );
                Ok(Some(dispatched))
            }
            Err(e) => {
                metrics::SINK_FAILURES.inc();
                tracing::warn!(
                    watch_id = %dispatched.event().watch_id(),
                    "Sink delivery failed: {}",
                    e
                );
                Err(match e {
                    Error::SinkDeliveryFailed(_) => e,
                    other => Error::sink(other.to_string()),
                })
            }
        }
    }

    /// Current dispatch state.
    #[must_use]
    pub const fn state(&self) -> DispatchState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn slot(&self) -> &HandoffSlot {
        &self.slot
    }

    /// Borrow the sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Recover the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

//! Command dispatcher: the mention-driven event loop.
//!
//! Single consumer over the inbound event channel. Two logical states:
//! Listening, and the terminal ShuttingDown entered on cancellation. Each
//! envelope is acknowledged exactly once, before any processing, and a reply
//! is always posted for a mention, report or not.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::command::parse_command;
use crate::error::Result;
use crate::event::{CallbackEvent, MentionEvent, SocketEvent};
use crate::report::Report;

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Acknowledge receipt of an Events API envelope.
    async fn ack(&self, envelope_id: &str) -> Result<()>;

    /// Post the reply to the originating channel. `None` sends the empty
    /// attachment used when no command was recognized.
    async fn post_message(&self, channel: &str, report: Option<&Report>) -> Result<()>;
}

/// Produces a scorecard for a target repository. Infallible by contract:
/// partial data degrades inside the pipeline, a report always comes back.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, target: &str) -> Report;
}

/// The event-consumption loop.
pub struct Dispatcher {
    events: UnboundedReceiver<SocketEvent>,
    transport: Arc<dyn ChatTransport>,
    reporter: Arc<dyn ReportGenerator>,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        events: UnboundedReceiver<SocketEvent>,
        transport: Arc<dyn ChatTransport>,
        reporter: Arc<dyn ReportGenerator>,
        cancel: CancellationToken,
    ) -> Self {
        Dispatcher {
            events,
            transport,
            reporter,
            cancel,
        }
    }

    /// Run until cancelled or the event channel closes.
    ///
    /// Events are processed one at a time to completion, including the
    /// synchronous report generation a mention may trigger; an already
    /// dequeued event is never interrupted by cancellation.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    info!("shutting down event dispatcher");
                    return;
                }
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        info!("event channel closed, dispatcher exiting");
                        return;
                    }
                },
            }
        }
    }

    async fn handle_event(&self, event: SocketEvent) {
        match event {
            SocketEvent::EventsApi(envelope) => {
                // Ack first, unconditionally, exactly once per envelope.
                if let Err(err) = self.transport.ack(&envelope.envelope_id).await {
                    warn!(envelope_id = %envelope.envelope_id, error = %err, "failed to ack envelope");
                }
                match envelope.payload.event {
                    CallbackEvent::AppMention(mention) => self.handle_mention(mention).await,
                    CallbackEvent::Other => debug!("ignoring non-mention callback event"),
                }
            }
            SocketEvent::Hello => debug!("socket mode connection established"),
            SocketEvent::Disconnect => info!("socket mode disconnect notice received"),
            SocketEvent::Other => warn!("discarding unsupported socket event"),
        }
    }

    async fn handle_mention(&self, mention: MentionEvent) {
        let report = match parse_command(&mention.text) {
            Some(command) => {
                info!(target = %command.target, channel = %mention.channel, "generating health report");
                Some(self.reporter.generate(&command.target).await)
            }
            None => {
                debug!(channel = %mention.channel, "mention carried no recognized command");
                None
            }
        };

        if let Err(err) = self.transport.post_message(&mention.channel, report.as_ref()).await {
            error!(channel = %mention.channel, error = %err, "failed to post reply");
        }
    }
}

//! Inbound chat event types.
//!
//! Closed tagged unions over the Socket Mode wire protocol, deserialized
//! straight from the JSON frames. Unknown message or callback types collapse
//! into `Other` variants so the dispatcher can discard them without failing.

use serde::Deserialize;

/// Top-level socket mode message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SocketEvent {
    /// Connection greeting; carries nothing the dispatcher needs.
    Hello,
    /// An Events API envelope that must be acknowledged.
    EventsApi(EventEnvelope),
    /// Server asks the client to reconnect; the connection task handles it.
    Disconnect,
    /// Any message type this version does not understand.
    #[serde(other)]
    Other,
}

/// An Events API envelope. Acknowledged exactly once, before processing.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    pub envelope_id: String,
    pub payload: EventCallback,
}

/// The envelope payload wrapping the inner event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventCallback {
    pub event: CallbackEvent,
}

/// Inner event of an Events API callback.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    /// The bot was mentioned directly.
    AppMention(MentionEvent),
    /// Any other inner event type; ignored as a no-op.
    #[serde(other)]
    Other,
}

/// A mention addressed to the bot, one inbound command per event.
#[derive(Debug, Clone, Deserialize)]
pub struct MentionEvent {
    pub channel: String,
    pub text: String,
}

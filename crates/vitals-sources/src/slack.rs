//! Slack adapters: Web API replies and the Socket Mode event transport.
//!
//! `SocketModeClient` opens the websocket via `apps.connections.open` and
//! runs a connection task that forwards decoded [`SocketEvent`]s into an
//! unbounded channel (the producer half of the dispatcher's event queue)
//! while draining acknowledgments from a second channel back onto the
//! socket. `SlackTransport` is the [`ChatTransport`] the dispatcher talks
//! to: acks go to the connection task, replies go through the Web API.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};

use vitals_core::{ChatTransport, Report, Result, SocketEvent, VitalsError};

use crate::http_client;

const DEFAULT_BASE_URL: &str = "https://slack.com/api";

/// Slack Web API client (bot auth token).
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
    url: Option<String>,
}

impl SlackClient {
    pub fn new(auth_token: &str) -> Result<Self> {
        Ok(SlackClient {
            http: http_client()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: auth_token.to_string(),
        })
    }

    /// Point the client at a different API root (tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Post the reply for one mention. `None` sends the empty attachment
    /// used when no command was recognized.
    pub async fn post_message(&self, channel: &str, report: Option<&Report>) -> Result<()> {
        let attachment = match report {
            Some(report) => json!({ "title": report.title, "text": report.body }),
            None => json!({}),
        };
        let response = self
            .http
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(&self.auth_token)
            .json(&json!({ "channel": channel, "attachments": [attachment] }))
            .send()
            .await
            .map_err(VitalsError::transport)?;
        let body: ApiResponse = response.json().await.map_err(VitalsError::transport)?;
        if !body.ok {
            return Err(VitalsError::transport(format!(
                "chat.postMessage failed: {}",
                body.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        Ok(())
    }
}

/// A live socket mode connection.
///
/// `events` is the consumer half handed to the dispatcher; the connection
/// task exits when the server closes the socket, asks to disconnect, or
/// every ack sender is dropped.
pub struct SocketConnection {
    pub events: mpsc::UnboundedReceiver<SocketEvent>,
    acks: mpsc::UnboundedSender<String>,
    pub task: JoinHandle<()>,
}

impl SocketConnection {
    /// Sender used by [`SlackTransport`] to acknowledge envelopes.
    pub fn ack_sender(&self) -> mpsc::UnboundedSender<String> {
        self.acks.clone()
    }
}

/// Socket Mode bootstrap (app-level token).
pub struct SocketModeClient {
    http: reqwest::Client,
    base_url: String,
    app_token: String,
}

impl SocketModeClient {
    pub fn new(app_token: &str) -> Result<Self> {
        Ok(SocketModeClient {
            http: http_client()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            app_token: app_token.to_string(),
        })
    }

    /// Point the client at a different API root (tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Request a websocket URL from `apps.connections.open`.
    pub async fn open_connection_url(&self) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/apps.connections.open", self.base_url))
            .bearer_auth(&self.app_token)
            .send()
            .await
            .map_err(VitalsError::transport)?;
        let body: ApiResponse = response.json().await.map_err(VitalsError::transport)?;
        if !body.ok {
            return Err(VitalsError::transport(format!(
                "apps.connections.open failed: {}",
                body.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        body.url
            .ok_or_else(|| VitalsError::transport("apps.connections.open returned no url"))
    }

    /// Open the websocket and spawn the connection task.
    pub async fn connect(&self) -> Result<SocketConnection> {
        let url = self.open_connection_url().await?;
        let (socket, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(VitalsError::transport)?;
        info!("socket mode connection opened");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (acks_tx, acks_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_socket(socket, events_tx, acks_rx));
        Ok(SocketConnection {
            events: events_rx,
            acks: acks_tx,
            task,
        })
    }
}

async fn run_socket(
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    events: mpsc::UnboundedSender<SocketEvent>,
    mut acks: mpsc::UnboundedReceiver<String>,
) {
    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            maybe_ack = acks.recv() => match maybe_ack {
                Some(envelope_id) => {
                    let frame = json!({ "envelope_id": envelope_id }).to_string();
                    if let Err(err) = sink.send(Message::Text(frame)).await {
                        warn!(error = %err, "failed to send ack, closing socket task");
                        return;
                    }
                }
                // All ack senders dropped: the dispatcher is gone.
                None => return,
            },
            maybe_frame = stream.next() => match maybe_frame {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<SocketEvent>(&text) {
                    Ok(SocketEvent::Disconnect) => {
                        info!("server requested socket disconnect");
                        let _ = events.send(SocketEvent::Disconnect);
                        return;
                    }
                    Ok(event) => {
                        if events.send(event).is_err() {
                            return;
                        }
                    }
                    Err(err) => warn!(error = %err, "undecodable socket frame discarded"),
                },
                Some(Ok(Message::Ping(payload))) => {
                    if sink.send(Message::Pong(payload)).await.is_err() {
                        return;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("socket mode connection closed");
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(error = %err, "socket mode read error");
                    return;
                }
            },
        }
    }
}

/// The [`ChatTransport`] wired into the dispatcher.
pub struct SlackTransport {
    web: SlackClient,
    acks: mpsc::UnboundedSender<String>,
}

impl SlackTransport {
    pub fn new(web: SlackClient, acks: mpsc::UnboundedSender<String>) -> Self {
        SlackTransport { web, acks }
    }
}

#[async_trait]
impl ChatTransport for SlackTransport {
    async fn ack(&self, envelope_id: &str) -> Result<()> {
        self.acks
            .send(envelope_id.to_string())
            .map_err(|_| VitalsError::transport("socket connection closed"))
    }

    async fn post_message(&self, channel: &str, report: Option<&Report>) -> Result<()> {
        self.web.post_message(channel, report).await
    }
}

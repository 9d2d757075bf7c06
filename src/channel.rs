//! Push channel client.
//!
//! DESIGN
//! ======
//! `WsChannel::connect` dials the backend (retrying with exponential backoff),
//! then hands the socket to a background supervisor task. The supervisor
//! pumps outbound events from an unbounded queue and forwards decoded inbound
//! events to the caller's receiver. When the socket drops it redials with the
//! same attempt budget; outbound events queued in the meantime are sent on the
//! new connection.
//!
//! PROTOCOL
//! ========
//! The backend speaks socket.io over the Engine.IO WebSocket transport. Each
//! session waits for the server's open packet (`0{...}`), joins the default
//! namespace with `40`, and starts sending queued events once the server
//! acknowledges with `40`. Server pings (`2`) are answered with pongs (`3`).
//! Events travel both ways as `42["<name>",<payload>]`.
//!
//! The background task never touches application state. It only forwards
//! typed [`ServerEvent`]s; the app applies them in arrival order.
//!
//! The receiver closes when the supervisor gives up or the [`WsChannel`] is
//! dropped.

#[cfg(test)]
#[path = "channel_test.rs"]
mod channel_test;

use std::time::Duration;

use frames::{ClientEvent, Packet, ServerEvent};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

use crate::error::AppError;

const INITIAL_BACKOFF: Duration = Duration::from_millis(1000);
const MAX_BACKOFF: Duration = Duration::from_millis(5000);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound side of the push channel.
#[async_trait::async_trait]
pub trait PushChannel: Send + Sync {
    async fn emit(&self, event: ClientEvent) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub url: String,
    /// Connect attempts per (re)connection before giving up.
    pub attempts: u32,
    /// Delay before the second attempt; doubles up to 5s.
    pub initial_backoff: Duration,
}

impl ChannelConfig {
    #[must_use]
    pub fn new(url: impl Into<String>, attempts: u32) -> Self {
        Self { url: url.into(), attempts: attempts.max(1), initial_backoff: INITIAL_BACKOFF }
    }
}

/// [`PushChannel`] over a socket.io WebSocket.
#[derive(Clone)]
pub struct WsChannel {
    outbound: mpsc::UnboundedSender<ClientEvent>,
}

impl WsChannel {
    /// Connect and start the background supervisor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Channel`] if every attempt fails.
    pub async fn connect(config: ChannelConfig) -> Result<(Self, mpsc::UnboundedReceiver<ServerEvent>), AppError> {
        let stream = connect_with_retry(&config).await?;
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        tokio::spawn(supervise(config, stream, out_rx, in_tx));
        Ok((Self { outbound: out_tx }, in_rx))
    }
}

#[async_trait::async_trait]
impl PushChannel for WsChannel {
    async fn emit(&self, event: ClientEvent) -> Result<(), AppError> {
        self.outbound
            .send(event)
            .map_err(|_| AppError::Channel("push channel closed".to_owned()))
    }
}

async fn connect_with_retry(config: &ChannelConfig) -> Result<WsStream, AppError> {
    let mut delay = config.initial_backoff;
    let mut last_error = String::new();

    for attempt in 1..=config.attempts {
        match connect_async(config.url.as_str()).await {
            Ok((stream, _)) => {
                info!(attempt, url = %config.url, "push channel connected");
                return Ok(stream);
            }
            Err(e) => {
                warn!(attempt, error = %e, url = %config.url, "push channel connect failed");
                last_error = e.to_string();
            }
        }
        if attempt < config.attempts {
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_BACKOFF);
        }
    }

    Err(AppError::Channel(format!("gave up after {} attempts: {last_error}", config.attempts)))
}

enum SessionEnd {
    /// The local side is gone; stop for good.
    Shutdown,
    /// The socket dropped; try to reconnect.
    Disconnected,
}

async fn supervise(
    config: ChannelConfig,
    mut stream: WsStream,
    mut outbound: mpsc::UnboundedReceiver<ClientEvent>,
    inbound: mpsc::UnboundedSender<ServerEvent>,
) {
    loop {
        match run_session(stream, &mut outbound, &inbound).await {
            SessionEnd::Shutdown => {
                debug!("push channel shut down");
                return;
            }
            SessionEnd::Disconnected => warn!("push channel disconnected; reconnecting"),
        }
        stream = match connect_with_retry(&config).await {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "push channel lost");
                return;
            }
        };
    }
}

async fn run_session(
    stream: WsStream,
    outbound: &mut mpsc::UnboundedReceiver<ClientEvent>,
    inbound: &mpsc::UnboundedSender<ServerEvent>,
) -> SessionEnd {
    let (mut sink, mut source) = stream.split();
    // Outbound events wait in the queue until the namespace is joined.
    let mut joined = false;

    loop {
        tokio::select! {
            next = outbound.recv(), if joined => {
                let Some(event) = next else {
                    if let Err(e) = sink.close().await {
                        debug!(error = %e, "push channel close failed");
                    }
                    return SessionEnd::Shutdown;
                };
                let text = match frames::encode_client_event(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, event = event.name(), "dropping unencodable event");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    warn!(error = %e, event = event.name(), "push channel send failed");
                    return SessionEnd::Disconnected;
                }
            }
            message = source.next() => {
                let text = match message {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::Disconnected,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!(error = %e, "push channel read failed");
                        return SessionEnd::Disconnected;
                    }
                };
                let packet = match frames::decode_packet(&text) {
                    Ok(packet) => packet,
                    Err(e) => {
                        warn!(error = %e, "ignoring undecodable push message");
                        continue;
                    }
                };
                let reply = match packet {
                    Packet::Open(_) => Some(Packet::Connect),
                    Packet::Ping => Some(Packet::Pong),
                    Packet::Connect => {
                        debug!("push channel namespace joined");
                        joined = true;
                        None
                    }
                    Packet::Event { name, data } => {
                        match frames::server_event(name, data) {
                            Ok(event) => {
                                if inbound.send(event).is_err() {
                                    return SessionEnd::Shutdown;
                                }
                            }
                            Err(e) => warn!(error = %e, "ignoring undecodable push event"),
                        }
                        None
                    }
                    Packet::ConnectError(info) => {
                        warn!(%info, "push channel namespace refused");
                        return SessionEnd::Disconnected;
                    }
                    Packet::Close | Packet::Disconnect => return SessionEnd::Disconnected,
                    Packet::Pong | Packet::Noop => None,
                };
                if let Some(reply) = reply {
                    if let Err(e) = send_packet(&mut sink, &reply).await {
                        warn!(error = %e, "push channel send failed");
                        return SessionEnd::Disconnected;
                    }
                }
            }
        }
    }
}

async fn send_packet(sink: &mut SplitSink<WsStream, Message>, packet: &Packet) -> Result<(), AppError> {
    let text = frames::encode_packet(packet)?;
    sink.send(Message::Text(text.into())).await.map_err(|e| AppError::Channel(e.to_string()))
}

//! Shared wire model for the pixel board backend.
//!
//! This crate owns the JSON shapes exchanged with the backend: REST payloads
//! (pixels, leaderboard rows, registration and stats bodies) and the push
//! channel packets. The push channel is socket.io (protocol 5) over the
//! Engine.IO v4 WebSocket transport: every text frame is one Engine.IO packet,
//! and events travel as `42["<name>",<payload>]`. Inbound pixels are validated
//! here so the rest of the client only ever sees well-formed ids and `#rrggbb`
//! colors.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound event: a batch of repainted pixels.
pub const EVENT_UPDATE_PIXELS: &str = "updatePixels";
/// Inbound event: the full leaderboard, replacing the previous one.
pub const EVENT_LEADERBOARD_UPDATE: &str = "leaderboardUpdate";
/// Outbound event: pixels painted by a confirmed transaction.
pub const EVENT_PAINT_PIXELS: &str = "paintPixels";

/// Error returned by the codec and validation functions.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text was not valid JSON or did not match the expected shape.
    #[error("failed to decode json: {0}")]
    Json(#[from] serde_json::Error),
    /// The event named something this client does not understand.
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    /// The frame is not a well-formed Engine.IO / socket.io packet.
    #[error("malformed packet: {0:?}")]
    MalformedPacket(String),
    /// A well-formed packet that does not carry an event.
    #[error("expected an event packet, got {0:?}")]
    NotAnEvent(String),
    /// A pixel arrived without an identifier.
    #[error("pixel has an empty id")]
    EmptyPixelId,
    /// A pixel color is not a `#rgb` / `#rrggbb` hex string.
    #[error("pixel {id} has invalid color {color:?}")]
    InvalidColor { id: String, color: String },
}

/// Integer grid coordinate of a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePosition {
    #[serde(deserialize_with = "grid_coord")]
    pub x: i32,
    #[serde(deserialize_with = "grid_coord")]
    pub y: i32,
}

/// A painted pixel as stored by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePixel {
    #[serde(rename = "_id")]
    pub id: String,
    pub position: WirePosition,
    pub color: String,
}

/// One leaderboard row, also returned by `GET /user/{address}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub wallet_address: String,
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub pixels_painted: u64,
}

/// Body of `POST /users`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub wallet_address: String,
}

/// Body of `POST /users/stats`, sent after a confirmed paint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaint {
    pub wallet_address: String,
    pub pixels_painted: u64,
    pub transaction_hash: String,
    /// Total fee in wei, as a decimal string.
    pub fee: String,
}

/// Payload of the outbound `paintPixels` event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintPixels {
    /// Ids of the repainted pixels.
    pub pixels: Vec<String>,
    pub color: String,
    pub transaction_hash: String,
    pub user_address: String,
}

/// Events pushed by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    UpdatePixels(Vec<WirePixel>),
    LeaderboardUpdate(Vec<UserStats>),
}

impl ServerEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdatePixels(_) => EVENT_UPDATE_PIXELS,
            Self::LeaderboardUpdate(_) => EVENT_LEADERBOARD_UPDATE,
        }
    }
}

/// Events sent by the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    PaintPixels(PaintPixels),
}

impl ClientEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PaintPixels(_) => EVENT_PAINT_PIXELS,
        }
    }
}

/// One Engine.IO text packet, with the socket.io packets it carries on the
/// default namespace.
#[derive(Clone, Debug, PartialEq)]
pub enum Packet {
    /// `0{...}`: Engine.IO handshake (sid, ping interval and timeout).
    Open(Value),
    /// `1`
    Close,
    /// `2`: heartbeat from the server; answer with [`Packet::Pong`].
    Ping,
    /// `3`
    Pong,
    /// `6`
    Noop,
    /// `40`: namespace connect request (client) or acknowledgement (server).
    Connect,
    /// `41`
    Disconnect,
    /// `42["name",data]`: only the first argument is kept.
    Event { name: String, data: Value },
    /// `44{...}`: the server refused the namespace connect.
    ConnectError(Value),
}

/// Parse one text frame.
///
/// # Errors
///
/// Returns [`CodecError::MalformedPacket`] for unknown packet types, packets
/// addressed to another namespace, and events without a name, and
/// [`CodecError::Json`] for malformed payloads.
pub fn decode_packet(text: &str) -> Result<Packet, CodecError> {
    let malformed = || CodecError::MalformedPacket(text.to_owned());
    let mut chars = text.chars();
    let packet = match chars.next() {
        Some('0') => Packet::Open(json_or_null(chars.as_str())?),
        Some('1') => Packet::Close,
        Some('2') => Packet::Ping,
        Some('3') => Packet::Pong,
        Some('6') => Packet::Noop,
        Some('4') => {
            let kind = chars.next().ok_or_else(malformed)?;
            let body = chars.as_str();
            if body.starts_with('/') {
                return Err(malformed());
            }
            match kind {
                '0' => Packet::Connect,
                '1' => Packet::Disconnect,
                '2' => decode_event(text, body.trim_start_matches(|c: char| c.is_ascii_digit()))?,
                '4' => Packet::ConnectError(json_or_null(body)?),
                _ => return Err(malformed()),
            }
        }
        _ => return Err(malformed()),
    };
    Ok(packet)
}

/// Encode one packet as a text frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if a payload cannot be serialized.
pub fn encode_packet(packet: &Packet) -> Result<String, CodecError> {
    Ok(match packet {
        Packet::Open(info) => format!("0{}", serde_json::to_string(info)?),
        Packet::Close => "1".to_owned(),
        Packet::Ping => "2".to_owned(),
        Packet::Pong => "3".to_owned(),
        Packet::Noop => "6".to_owned(),
        Packet::Connect => "40".to_owned(),
        Packet::Disconnect => "41".to_owned(),
        Packet::Event { name, data } => format!("42{}", serde_json::to_string(&(name, data))?),
        Packet::ConnectError(info) => format!("44{}", serde_json::to_string(info)?),
    })
}

/// `args` is the JSON argument list, after any ack id.
fn decode_event(text: &str, args: &str) -> Result<Packet, CodecError> {
    let args: Vec<Value> = serde_json::from_str(args)?;
    let mut args = args.into_iter();
    let Some(Value::String(name)) = args.next() else {
        return Err(CodecError::MalformedPacket(text.to_owned()));
    };
    Ok(Packet::Event { name, data: args.next().unwrap_or(Value::Null) })
}

fn json_or_null(body: &str) -> Result<Value, CodecError> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

fn into_event(packet: Packet) -> Result<(String, Value), CodecError> {
    match packet {
        Packet::Event { name, data } => Ok((name, data)),
        other => Err(CodecError::NotAnEvent(format!("{other:?}"))),
    }
}

/// Build a server event from an event packet's name and payload. Pixel
/// batches are validated.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for payloads of the wrong shape,
/// [`CodecError::UnknownEvent`] for unrecognized event names, and the
/// validation errors of [`validate_pixels`].
pub fn server_event(name: String, data: Value) -> Result<ServerEvent, CodecError> {
    match name.as_str() {
        EVENT_UPDATE_PIXELS => {
            let pixels: Vec<WirePixel> = serde_json::from_value(data)?;
            validate_pixels(&pixels)?;
            Ok(ServerEvent::UpdatePixels(pixels))
        }
        EVENT_LEADERBOARD_UPDATE => Ok(ServerEvent::LeaderboardUpdate(serde_json::from_value(data)?)),
        _ => Err(CodecError::UnknownEvent(name)),
    }
}

/// Decode one `42[...]` push-channel frame.
///
/// # Errors
///
/// Returns the errors of [`decode_packet`] and [`server_event`], and
/// [`CodecError::NotAnEvent`] for control packets.
pub fn decode_server_event(text: &str) -> Result<ServerEvent, CodecError> {
    let (name, data) = into_event(decode_packet(text)?)?;
    server_event(name, data)
}

/// Encode a server event as a `42[...]` frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the payload cannot be serialized.
pub fn encode_server_event(event: &ServerEvent) -> Result<String, CodecError> {
    let data = match event {
        ServerEvent::UpdatePixels(pixels) => serde_json::to_value(pixels)?,
        ServerEvent::LeaderboardUpdate(rows) => serde_json::to_value(rows)?,
    };
    encode_packet(&Packet::Event { name: event.name().to_owned(), data })
}

/// Decode a client `42[...]` frame.
///
/// # Errors
///
/// Returns the errors of [`decode_packet`], [`CodecError::NotAnEvent`] for
/// control packets, and [`CodecError::UnknownEvent`] for unrecognized names.
pub fn decode_client_event(text: &str) -> Result<ClientEvent, CodecError> {
    let (name, data) = into_event(decode_packet(text)?)?;
    match name.as_str() {
        EVENT_PAINT_PIXELS => Ok(ClientEvent::PaintPixels(serde_json::from_value(data)?)),
        _ => Err(CodecError::UnknownEvent(name)),
    }
}

/// Encode a client event as a `42[...]` frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the payload cannot be serialized.
pub fn encode_client_event(event: &ClientEvent) -> Result<String, CodecError> {
    let data = match event {
        ClientEvent::PaintPixels(paint) => serde_json::to_value(paint)?,
    };
    encode_packet(&Packet::Event { name: event.name().to_owned(), data })
}

/// Check that a pixel has an id and a hex color.
///
/// # Errors
///
/// Returns [`CodecError::EmptyPixelId`] or [`CodecError::InvalidColor`].
pub fn validate_pixel(pixel: &WirePixel) -> Result<(), CodecError> {
    if pixel.id.is_empty() {
        return Err(CodecError::EmptyPixelId);
    }
    if !is_hex_color(&pixel.color) {
        return Err(CodecError::InvalidColor { id: pixel.id.clone(), color: pixel.color.clone() });
    }
    Ok(())
}

/// Validate every pixel, stopping at the first failure.
///
/// # Errors
///
/// Returns the first error from [`validate_pixel`].
pub fn validate_pixels(pixels: &[WirePixel]) -> Result<(), CodecError> {
    pixels.iter().try_for_each(validate_pixel)
}

fn is_hex_color(raw: &str) -> bool {
    let Some(digits) = raw.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Grid coordinates arrive as JSON numbers; accept integral floats too.
fn grid_coord<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.fract() != 0.0 || raw < f64::from(i32::MIN) || raw > f64::from(i32::MAX) {
        return Err(de::Error::custom(format!("grid coordinate {raw} is not an integer")));
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(raw as i32)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Framing layer spoken on accepted connections before request framing.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WireProtocol {
    /// HTTP upgrade to a WebSocket; text and binary frames carry requests.
    #[default]
    #[serde(rename = "websocket")]
    #[strum(serialize = "websocket")]
    WebSocket,
    /// Bytes read straight from the socket.
    Raw,
}

/// Errors encountered while parsing a [`WireProtocol`] from text.
pub type WireProtocolParseError = strum::ParseError;

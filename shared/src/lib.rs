//! Shared protocol definitions for the game-server sidecar.
//!
//! This crate holds everything both the sidecar and its UDP peers agree on:
//! the plain-text command grammar spoken over the UDP socket, the JSON body
//! types posted to the control-plane API, the four upstream endpoints, and
//! the protocol constants (default port, retry policy).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default address the UDP socket binds to.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
/// Default UDP port answered by the sidecar.
pub const DEFAULT_PORT: u16 = 22222;
/// How many times a report is attempted before giving up.
pub const MAX_DELIVERY_ATTEMPTS: u32 = 5;
/// Fixed delay between report attempts, in milliseconds.
pub const RETRY_DELAY_MS: u64 = 5000;

/// The four reporting endpoints served by the control-plane API.
///
/// Paths match the control plane's router verbatim, including its
/// historical `setsdgshealth` spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    SetActivePlayers,
    SetHealth,
    SetState,
    SetMarkedForDeletion,
}

impl Endpoint {
    /// URL path component on the control-plane API.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::SetActivePlayers => "setactiveplayers",
            Endpoint::SetHealth => "setsdgshealth",
            Endpoint::SetState => "setdgsstate",
            Endpoint::SetMarkedForDeletion => "setdgsmarkedfordeletion",
        }
    }

    /// Human-readable field name used in reply text.
    pub fn field(&self) -> &'static str {
        match self {
            Endpoint::SetActivePlayers => "ActivePlayers",
            Endpoint::SetHealth => "Health",
            Endpoint::SetState => "State",
            Endpoint::SetMarkedForDeletion => "MarkedForDeletion",
        }
    }
}

/// A parsed inbound UDP message.
///
/// The grammar is `KEYWORD|value`, keyword matched case-insensitively
/// against the four reporting commands; anything else is treated as an
/// opaque ping and echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `PLAYERS|N` — report the active player count.
    Players(u32),
    /// `HEALTH|value` — report server health (e.g. `Healthy`).
    Health(String),
    /// `STATE|value` — report server state (e.g. `Assigned`).
    State(String),
    /// `MARKEDFORDELETION|value` — report the deletion marker.
    MarkedForDeletion(String),
    /// No keyword matched; the whole payload, echoed unmodified.
    Echo(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The PLAYERS argument was missing or not a non-negative integer.
    #[error("invalid player count {0:?}")]
    InvalidPlayerCount(String),
}

impl Command {
    /// Parses a decoded UDP payload into a command.
    ///
    /// Only the PLAYERS argument is validated (it must be a non-negative
    /// integer); the other commands carry their argument verbatim, with a
    /// missing `|value` part read as the empty string. Unmatched payloads
    /// are never an error, they fall through to [`Command::Echo`].
    pub fn parse(text: &str) -> Result<Command, ParseError> {
        let stripped = strip_trailing_newline(text);
        let (keyword, argument) = match stripped.split_once('|') {
            Some((keyword, argument)) => (keyword, argument),
            None => (stripped, ""),
        };

        match keyword.to_ascii_uppercase().as_str() {
            "PLAYERS" => match argument.parse::<u32>() {
                Ok(count) => Ok(Command::Players(count)),
                Err(_) => Err(ParseError::InvalidPlayerCount(argument.to_string())),
            },
            "HEALTH" => Ok(Command::Health(argument.to_string())),
            "STATE" => Ok(Command::State(argument.to_string())),
            "MARKEDFORDELETION" => Ok(Command::MarkedForDeletion(argument.to_string())),
            _ => Ok(Command::Echo(text.to_string())),
        }
    }
}

/// Strips one trailing newline (`\n` or `\r\n`) from a payload.
pub fn strip_trailing_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

/// JSON body for `setactiveplayers`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivePlayersReport {
    pub server_name: String,
    pub namespace: String,
    pub player_count: u32,
}

/// JSON body for `setsdgshealth`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub server_name: String,
    pub namespace: String,
    pub health: String,
}

/// JSON body for `setdgsstate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StateReport {
    pub server_name: String,
    pub namespace: String,
    pub state: String,
}

/// JSON body for `setdgsmarkedfordeletion`.
///
/// The marker is reported as the opaque string received over UDP; the
/// control plane owns its interpretation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkedForDeletionReport {
    pub server_name: String,
    pub namespace: String,
    pub marked_for_deletion: String,
}

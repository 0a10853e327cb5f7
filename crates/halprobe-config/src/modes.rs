//! Operating modes chosen by name in configuration files, environment
//! variables and flags.
//!
//! Names are `snake_case` on the wire and parse case-insensitively, so
//! `HALPROBE_ISOLATION=Thread` and `--log-format compact` both resolve.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Rendering of the daemon's structured telemetry on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per event.
    #[default]
    Json,
    /// One human-readable line per event.
    Compact,
}

/// How the acceptor isolates one agent session from another.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum IsolationMode {
    /// Fork a child process per accepted connection.
    #[default]
    Process,
    /// Run each session on its own thread with its own state.
    Thread,
}

/// Returned when a mode name matches no variant.
pub type ModeParseError = strum::ParseError;

//! Newline-delimited JSON codec between the host and the scheduler.

use harvest_fleet_core::{TurnOrders, TurnSnapshot};

/// Errors raised while translating protocol lines.
#[derive(Debug, thiserror::Error)]
pub(crate) enum WireError {
    /// The line held no payload.
    #[error("snapshot line was empty")]
    EmptyLine,
    /// The line could not be parsed into a snapshot.
    #[error("could not parse turn snapshot: {0}")]
    Decode(#[source] serde_json::Error),
    /// The orders could not be serialised.
    #[error("could not serialise turn orders: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Parses one stdin line into a snapshot.
pub(crate) fn decode_snapshot(line: &str) -> Result<TurnSnapshot, WireError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(WireError::EmptyLine);
    }
    serde_json::from_str(trimmed).map_err(WireError::Decode)
}

/// Best-effort turn number of a line that failed to decode.
pub(crate) fn turn_hint(line: &str) -> Option<u32> {
    let value: serde_json::Value = serde_json::from_str(line.trim()).ok()?;
    let turn = value.get("turn")?.as_u64()?;
    u32::try_from(turn).ok()
}

/// Serialises orders into a single stdout line, without the trailing newline.
pub(crate) fn encode_orders(orders: &TurnOrders) -> Result<String, WireError> {
    serde_json::to_string(orders).map_err(WireError::Encode)
}

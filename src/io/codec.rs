//! JSON codec for pick events (input) and picker aggregates (output)

use crate::domain::{Event, PickerAggregate};

/// Decode one newline-delimited JSON record.
///
/// Unknown fields are ignored. Missing required fields, bad timestamps and
/// unknown temperature zones are errors.
pub fn decode_event(line: &str) -> serde_json::Result<Event> {
    serde_json::from_str(line)
}

/// Encode the final result as a compact JSON array (`[]` when empty)
pub fn encode_pickers(pickers: &[PickerAggregate]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(pickers)
}

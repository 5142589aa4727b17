//! IO modules - input collection and wire format
//!
//! - `line_reader` - Bounded, deadline-aware line collection from a blocking source
//! - `codec` - JSON decoding of pick events and encoding of picker aggregates

pub mod codec;
pub mod line_reader;

// Re-export commonly used types
pub use codec::{decode_event, encode_pickers};
pub use line_reader::{BoundedLineReader, CollectedLines, StopReason};

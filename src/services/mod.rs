//! Services - processing logic
//!
//! - `pipeline` - decode, zone filter, group by picker, sort
//! - `processor` - `StreamProcessor` trait and the bounded `PickingStreamProcessor`
//! - `factory` - `EventProcessorFactory` trait and `PickingProcessorFactory`

pub mod factory;
pub mod pipeline;
pub mod processor;

// Re-export commonly used types
pub use factory::{EventProcessorFactory, PickingProcessorFactory};
pub use processor::{PickingStreamProcessor, ProcessSummary, StreamProcessor};

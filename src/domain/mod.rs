//! Domain models - pick events, exclusion policy and per-picker aggregates
//!
//! - `types` - decoded input records (`Event`, `Article`, `PickerIdentity`, `TemperatureZone`)
//! - `zone_filter` - `ZoneFilter`, the set of excluded temperature zones
//! - `picker` - output-facing `PickerAggregate` and `PickItem`

pub mod picker;
pub mod types;
pub mod zone_filter;

// Re-export commonly used types at module level
pub use picker::{PickItem, PickerAggregate};
pub use types::{Article, Event, PickerIdentity, TemperatureZone, Timestamp};
pub use zone_filter::ZoneFilter;

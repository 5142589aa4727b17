//! Per-picker output model

use crate::domain::types::{iso_seconds, Event, PickerIdentity, Timestamp};
use serde::Serialize;

/// A single pick as it appears in the output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickItem {
    pub article_name: String,
    #[serde(with = "iso_seconds")]
    pub timestamp: Timestamp,
}

impl PickItem {
    /// Article name is upper-cased for output
    pub fn from_event(event: &Event) -> Self {
        Self { article_name: event.article.name.to_uppercase(), timestamp: event.timestamp }
    }
}

/// All accepted picks of one picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerAggregate {
    /// Grouping and tie-break key, never serialized
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "picker_name")]
    pub name: String,
    #[serde(with = "iso_seconds")]
    pub active_since: Timestamp,
    pub picks: Vec<PickItem>,
}

impl PickerAggregate {
    pub fn new(picker: &PickerIdentity) -> Self {
        Self {
            id: picker.id.clone(),
            name: picker.name.clone(),
            active_since: picker.active_since,
            picks: Vec::new(),
        }
    }

    #[inline]
    pub fn push(&mut self, pick: PickItem) {
        self.picks.push(pick);
    }
}

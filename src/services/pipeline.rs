//! Transform pipeline: decode → filter by zone → group by picker → sort
//!
//! Apart from decoding, every step is a total function over its input. The
//! final order is fully determined by the data: pickers by
//! `(active_since, id)`, picks within a picker by timestamp, with equal
//! timestamps kept in input order.

use crate::domain::{Event, PickItem, PickerAggregate, ZoneFilter};
use crate::error::{ProcessError, Result};
use crate::io::decode_event;
use rustc_hash::FxHashMap;

/// Events that passed the zone filter, in input order
#[derive(Debug, Clone, Default)]
pub struct FilteredEvents {
    pub accepted: Vec<Event>,
    pub excluded: usize,
}

/// Decode every line and drop events in an excluded zone.
///
/// The first undecodable line aborts the whole batch.
pub fn decode_and_filter<S: AsRef<str>>(lines: &[S], filter: &ZoneFilter) -> Result<FilteredEvents> {
    let mut filtered = FilteredEvents { accepted: Vec::with_capacity(lines.len()), excluded: 0 };

    for (index, line) in lines.iter().enumerate() {
        let event = decode_event(line.as_ref())
            .map_err(|source| ProcessError::Decode { line: index + 1, source })?;

        if filter.accepts(&event) {
            filtered.accepted.push(event);
        } else {
            filtered.excluded += 1;
        }
    }

    Ok(filtered)
}

/// Fold events into one aggregate per picker id.
///
/// Name and `active_since` come from the first event seen for an id; later
/// events for the same id are trusted to carry the same identity.
/// The returned order is unspecified.
pub fn group_by_picker<I>(events: I) -> Vec<PickerAggregate>
where
    I: IntoIterator<Item = Event>,
{
    let mut by_id: FxHashMap<String, PickerAggregate> = FxHashMap::default();

    for event in events {
        let pick = PickItem::from_event(&event);
        by_id
            .entry(event.picker.id.clone())
            .or_insert_with(|| PickerAggregate::new(&event.picker))
            .push(pick);
    }

    by_id.into_values().collect()
}

/// Order pickers by `(active_since, id)` and each picker's picks by timestamp
pub fn sort_pickers(mut pickers: Vec<PickerAggregate>) -> Vec<PickerAggregate> {
    pickers.sort_by(|a, b| a.active_since.cmp(&b.active_since).then_with(|| a.id.cmp(&b.id)));

    // sort_by_key is stable: equal timestamps keep their input order
    for picker in &mut pickers {
        picker.picks.sort_by_key(|pick| pick.timestamp);
    }

    pickers
}

/// Group and sort in one step
pub fn aggregate<I>(events: I) -> Vec<PickerAggregate>
where
    I: IntoIterator<Item = Event>,
{
    sort_pickers(group_by_picker(events))
}

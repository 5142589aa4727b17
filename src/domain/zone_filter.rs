//! Temperature zone exclusion policy

use crate::domain::types::{Event, TemperatureZone};
use rustc_hash::FxHashSet;
use tracing::warn;

/// Set of temperature zones whose picks are dropped from the result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneFilter {
    excluded: FxHashSet<TemperatureZone>,
}

impl ZoneFilter {
    pub fn new(excluded: impl IntoIterator<Item = TemperatureZone>) -> Self {
        Self { excluded: excluded.into_iter().collect() }
    }

    /// Build from external tokens. Unknown tokens are logged and skipped.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut excluded = FxHashSet::default();
        for token in tokens {
            let token = token.as_ref();
            match TemperatureZone::from_token(token) {
                Some(zone) => {
                    excluded.insert(zone);
                }
                None => warn!(token = %token, "unknown_temperature_zone_ignored"),
            }
        }
        Self { excluded }
    }

    #[inline]
    pub fn excludes(&self, zone: TemperatureZone) -> bool {
        self.excluded.contains(&zone)
    }

    #[inline]
    pub fn accepts(&self, event: &Event) -> bool {
        !self.excludes(event.article.zone)
    }

    /// Excluded zones in a stable order, for logging
    pub fn excluded(&self) -> Vec<TemperatureZone> {
        let mut zones: Vec<_> = self.excluded.iter().copied().collect();
        zones.sort();
        zones
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

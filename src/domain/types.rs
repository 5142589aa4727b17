//! Pick event types decoded from the input stream

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// Instant in UTC, second precision on the wire
pub type Timestamp = DateTime<Utc>;

/// Storage temperature class of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureZone {
    Ambient,
    Chilled,
}

impl TemperatureZone {
    pub const ALL: [TemperatureZone; 2] = [TemperatureZone::Ambient, TemperatureZone::Chilled];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureZone::Ambient => "ambient",
            TemperatureZone::Chilled => "chilled",
        }
    }

    /// Match an external token (e.g. from config) against the known zones.
    ///
    /// Surrounding whitespace and ASCII case are ignored. Returns `None` for
    /// tokens that name no known zone.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL.into_iter().find(|zone| zone.as_str().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for TemperatureZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Article {
    pub id: String,
    pub name: String,
    #[serde(rename = "temperature_zone")]
    pub zone: TemperatureZone,
}

/// Picker as embedded in each event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PickerIdentity {
    pub id: String,
    pub name: String,
    #[serde(with = "iso_seconds")]
    pub active_since: Timestamp,
}

/// One pick action: a picker retrieving a quantity of an article
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(with = "iso_seconds")]
    pub timestamp: Timestamp,
    pub picker: PickerIdentity,
    pub article: Article,
    pub quantity: i64,
}

/// `yyyy-MM-dd'T'HH:mm:ss'Z'` timestamps.
///
/// Decoding accepts any RFC 3339 instant and normalizes it to UTC.
/// Encoding always writes whole seconds with a literal `Z`.
pub mod iso_seconds {
    use super::Timestamp;
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::borrow::Cow;

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn parse(raw: &str) -> Result<Timestamp, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw.trim()).map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Cow::<str>::deserialize(deserializer)?;
        parse(&raw).map_err(|e| de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}

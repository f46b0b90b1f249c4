//! Server-assigned timestamp handling.
//!
//! Creation and update times on persisted records are assigned by the
//! store, not by the caller's clock. A pending write therefore carries a
//! [`Timestamp::Now`] sentinel that the sink adapter translates into the
//! store's native server-time directive at commit; only resolved
//! [`Timestamp::Fixed`] values ever come back out of the store.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Wire sentinel for a server-assigned time. Never persisted: every sink
/// adapter must resolve it before the document reaches storage.
pub const SERVER_TIME_SENTINEL: &str = "__server_timestamp__";

/// A record timestamp: either "assign at the server on commit" or an
/// already-resolved instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Resolved by the store at commit time.
    Now,
    /// A concrete instant, as read back from the store.
    Fixed(DateTime<Utc>),
}

impl Timestamp {
    /// Returns true for the unresolved server-time sentinel.
    #[must_use]
    pub const fn is_now(&self) -> bool {
        matches!(self, Self::Now)
    }

    /// Resolves the sentinel against the given store clock reading;
    /// fixed values pass through unchanged.
    #[must_use]
    pub fn resolve(self, store_now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Now => store_now,
            Self::Fixed(t) => t,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => write!(f, "{SERVER_TIME_SENTINEL}"),
            Self::Fixed(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::Micros, true)),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Fixed(t)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Now => serializer.serialize_str(SERVER_TIME_SENTINEL),
            Self::Fixed(t) => {
                serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TimestampVisitor;

        impl Visitor<'_> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an RFC 3339 timestamp or the server-time sentinel")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Timestamp, E> {
                if v == SERVER_TIME_SENTINEL {
                    return Ok(Timestamp::Now);
                }
                DateTime::parse_from_rfc3339(v)
                    .map(|t| Timestamp::Fixed(t.with_timezone(&Utc)))
                    .map_err(|e| E::custom(format!("invalid timestamp '{v}': {e}")))
            }
        }

        deserializer.deserialize_str(TimestampVisitor)
    }
}

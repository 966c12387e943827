//! Serde helpers for configuration types

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize a [`Duration`] as whole milliseconds (u64)
///
/// Durations beyond `u64::MAX` milliseconds saturate.
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use evicache::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Settings {
///     #[serde(with = "duration_millis")]
///     ttl: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::*;

    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

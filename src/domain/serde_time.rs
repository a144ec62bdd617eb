//! Durations travel as integer nanoseconds on the wire.
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

pub(crate) mod duration_nanos {
    use super::{Deserialize, Deserializer, Duration, Serializer};

    pub(crate) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(super::duration_to_nanos(*value))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}

#[must_use]
pub(crate) fn duration_to_nanos(value: Duration) -> u64 {
    u64::try_from(value.as_nanos()).unwrap_or(u64::MAX)
}

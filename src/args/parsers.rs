use std::time::Duration;

use super::types::PositiveUsize;
use crate::error::{AppError, AppResult, ValidationError};

const MICROS_PER_MILLI: u128 = 1_000;
const MILLIS_PER_SECOND: u128 = 1_000;

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

/// Parses `<int><unit>` with units `us`, `ms`, `s`, `m`, `h`; a bare number
/// means seconds. Zero is accepted here so callers can report their own error.
///
/// # Errors
///
/// Returns an error for an empty value, a missing number, an unknown unit or
/// overflow.
pub fn parse_duration_value(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "us" => Duration::from_micros(number),
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    Ok(duration)
}

/// CLI flavor of [`parse_duration_value`] that also rejects zero.
pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    let duration = parse_duration_value(s)?;
    if duration.is_zero() {
        return Err(AppError::validation(ValidationError::DurationZero));
    }
    Ok(duration)
}

/// Renders a duration in the largest unit that keeps it exact, so it parses
/// back to the same value. Sub-microsecond precision is dropped.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();
    if micros.checked_rem(MICROS_PER_MILLI) != Some(0) {
        return format!("{}us", micros);
    }
    let millis = duration.as_millis();
    if millis.checked_rem(MILLIS_PER_SECOND) != Some(0) {
        return format!("{}ms", millis);
    }
    format!("{}s", duration.as_secs())
}

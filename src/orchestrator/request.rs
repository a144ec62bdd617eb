use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use url::Url;

use crate::args::parse_duration_value;
use crate::error::ValidationError;
use crate::runner::MAX_TIMEOUT;

/// Largest total worker count a single run may ask for.
pub const MAX_CONCURRENCY: usize = 100_000;

/// A validated `/start` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub concurrency: usize,
    pub duration: Duration,
    pub timeout: Duration,
    pub url: String,
    pub meta: BTreeMap<String, String>,
}

impl StartRequest {
    /// Validates query parameters in a fixed order and stops at the first
    /// failure: concurrency, duration, timeout, url, then the body.
    ///
    /// # Errors
    ///
    /// Returns the validation error whose message is sent back as the 400
    /// reason.
    pub fn from_query(
        query: &HashMap<String, String>,
        body: &[u8],
    ) -> Result<Self, ValidationError> {
        let concurrency = query
            .get("concurrency")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .ok_or(ValidationError::ConcurrencyNotPositive)?;
        if concurrency > MAX_CONCURRENCY {
            return Err(ValidationError::ConcurrencyTooLarge {
                max: MAX_CONCURRENCY,
            });
        }

        let duration = query
            .get("duration")
            .and_then(|value| parse_duration_value(value).ok())
            .filter(|value| !value.is_zero())
            .ok_or(ValidationError::DurationNotPositive)?;

        let timeout = query
            .get("timeout")
            .and_then(|value| parse_duration_value(value).ok())
            .filter(|value| !value.is_zero() && *value <= MAX_TIMEOUT)
            .ok_or(ValidationError::TimeoutOutOfRange)?;

        // Keep the raw text: parsing would percent-encode a `{random}` token.
        let url = query
            .get("url")
            .filter(|value| Url::parse(value).is_ok())
            .ok_or(ValidationError::UrlNotAbsolute)?;

        Ok(Self {
            concurrency,
            duration,
            timeout,
            url: url.clone(),
            meta: parse_meta(body)?,
        })
    }
}

/// An empty body or `null` means no metadata.
fn parse_meta(body: &[u8]) -> Result<BTreeMap<String, String>, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    let meta: Option<BTreeMap<String, String>> = serde_json::from_slice(body)
        .map_err(|err| ValidationError::InvalidMetadata { source: err })?;
    Ok(meta.unwrap_or_default())
}

/// Reads a required query parameter.
///
/// # Errors
///
/// Returns [`ValidationError::MissingParameter`] when the key is absent or
/// empty.
pub fn required<'query>(
    query: &'query HashMap<String, String>,
    name: &'static str,
) -> Result<&'query str, ValidationError> {
    query
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(ValidationError::MissingParameter { name })
}

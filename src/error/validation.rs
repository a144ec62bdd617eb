use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Missing query parameter '{name}'.")]
    MissingParameter { name: &'static str },
    #[error("concurrency must be > 0")]
    ConcurrencyNotPositive,
    #[error("concurrency must be <= {max}")]
    ConcurrencyTooLarge { max: usize },
    #[error("duration must be > 0")]
    DurationNotPositive,
    #[error("timeout must be > 0 and <= 2s")]
    TimeoutOutOfRange,
    #[error("url must be a valid absolute url")]
    UrlNotAbsolute,
    #[error("metadata body must be a JSON object of strings: {source}")]
    InvalidMetadata {
        #[source]
        source: serde_json::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}

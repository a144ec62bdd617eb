use std::fmt::Debug;

use rand::{Rng, thread_rng};

/// Token substituted by [`RandomIntReplacer`].
pub const RANDOM_TOKEN: &str = "{random}";
/// Exclusive upper bound for the substituted integer.
pub const DEFAULT_RANDOM_MAX: u64 = 5_000_000;

/// Rewrites the target URL before each request.
pub trait UrlReplacer: Send + Sync + Debug {
    fn replace(&self, url: &str) -> String;
}

/// Leaves the URL untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityReplacer;

impl UrlReplacer for IdentityReplacer {
    fn replace(&self, url: &str) -> String {
        url.to_owned()
    }
}

/// Replaces every occurrence of a token with one random integer in `[0, max)`.
#[derive(Debug, Clone)]
pub struct RandomIntReplacer {
    key: String,
    max: u64,
}

impl RandomIntReplacer {
    #[must_use]
    pub fn new(max: u64) -> Self {
        Self::with_key(RANDOM_TOKEN, max)
    }

    #[must_use]
    pub fn with_key(key: &str, max: u64) -> Self {
        Self {
            key: key.to_owned(),
            max: max.max(1),
        }
    }
}

impl Default for RandomIntReplacer {
    fn default() -> Self {
        Self::new(DEFAULT_RANDOM_MAX)
    }
}

impl UrlReplacer for RandomIntReplacer {
    fn replace(&self, url: &str) -> String {
        if self.key.is_empty() || !url.contains(&self.key) {
            return url.to_owned();
        }
        let value = thread_rng().gen_range(0..self.max);
        url.replace(&self.key, &value.to_string())
    }
}

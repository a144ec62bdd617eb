//! Target-side HTTP: request execution, URL templating and the worker pool.
mod execution;
mod generator;
mod replacer;


pub use execution::{build_target_client, execute_get};
pub use generator::LoadGenerator;
pub use replacer::{
    DEFAULT_RANDOM_MAX, IdentityReplacer, RANDOM_TOKEN, RandomIntReplacer, UrlReplacer,
};

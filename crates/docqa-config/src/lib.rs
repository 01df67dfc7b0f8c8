//! Configuration management for docqa
//!
//! Typed configuration structs loaded from `.docqa.yml` (falling back to
//! defaults when no file is present), with a validation pass that rejects
//! out-of-range thresholds before anything is built against them.
//!
//! # Example
//!
//! ```no_run
//! use docqa_config::Config;
//!
//! let config = Config::load()?;
//! let top_k = config.retrieval.top_k;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod error;
pub mod types;
pub mod validation;

pub use error::{ConfigError, Result};
pub use types::*;
pub use validation::Validate;

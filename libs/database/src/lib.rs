//! Database connectors and shared connection utilities.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client setup and health checks
//! - `config` - `core_config::FromEnv` support for the connection configs
//! - `all` - everything
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//! use core_config::FromEnv;
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{RetryConfig, retry, retry_with_backoff};

//! AWS Parameter Store integration for paramguard
//!
//! Fetches parameters for a job, turns them into environment variables, and
//! registers secure values with the job's
//! [`SecretRegistry`](paramguard_secrets::SecretRegistry) so that its
//! output can be redacted.
//!
//! ```ignore
//! use paramguard_aws::{AwsParameterStore, ParameterStoreConfig, ParameterStoreJob};
//!
//! let config = ParameterStoreConfig::new()
//!     .with_path("/app/prod", true)
//!     .hide_secure_strings(true);
//! let store = AwsParameterStore::from_config(&config).await;
//! let job = ParameterStoreJob::new(config);
//!
//! let env = job.set_up(&store).await?;
//! let stdout = job.log_filter().decorate(std::io::stdout());
//! ```

pub mod naming;

mod config;
mod job;
mod source;
mod ssm;

pub use config::{DEFAULT_OPTION, DEFAULT_REGION, ParameterStoreConfig};
pub use job::{JobEnvironment, ParameterStoreJob};
pub use naming::NamingMode;
pub use source::{ParameterQuery, ParameterSource, StaticParameterSource};
pub use ssm::AwsParameterStore;

use thiserror::Error;

/// Error types for parameter-store access
#[derive(Debug, Error)]
pub enum ParameterStoreError {
    /// A name filter could not be built or is not supported
    #[error("Invalid parameter filter: {message}")]
    InvalidFilter {
        /// What was wrong with the filter
        message: String,
    },

    /// The job configuration could not be parsed
    #[error("Invalid parameter store configuration: {message}")]
    InvalidConfig {
        /// Parser error message
        message: String,
    },
}

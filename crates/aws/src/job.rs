//! Job wiring
//!
//! [`ParameterStoreJob`] ties one job invocation together: fetch the
//! configured parameters, register the secure ones, hand back the environment
//! variables, and provide the [`LogFilter`] for the job's output.

use crate::naming::env_var_name;
use crate::{ParameterSource, ParameterStoreConfig, ParameterStoreError};
use paramguard_secrets::{LogFilter, Parameter, SecretRegistry};
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;

/// Environment variables derived from fetched parameters.
///
/// Values are held as `SecretString`; `Debug` lists names only.
#[derive(Default)]
pub struct JobEnvironment {
    vars: BTreeMap<String, SecretString>,
}

impl JobEnvironment {
    /// Look up a variable's value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|value| value.expose_secret())
    }

    /// Number of variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if there are no variables
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variable names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Name/value pairs for applying to a process environment.
    ///
    /// Values are exposed; they must not be logged.
    pub fn iter_exposed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .map(|(name, value)| (name.as_str(), value.expose_secret()))
    }
}

impl std::fmt::Debug for JobEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobEnvironment")
            .field("names", &self.vars.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// One job's view of the parameter store.
#[derive(Debug)]
pub struct ParameterStoreJob {
    config: ParameterStoreConfig,
    secrets: SecretRegistry,
}

impl ParameterStoreJob {
    /// Create a job with an empty secret registry
    #[must_use]
    pub fn new(config: ParameterStoreConfig) -> Self {
        Self {
            config,
            secrets: SecretRegistry::new(),
        }
    }

    /// The job's configuration
    #[must_use]
    pub const fn config(&self) -> &ParameterStoreConfig {
        &self.config
    }

    /// Secrets registered for this job
    #[must_use]
    pub const fn secrets(&self) -> &SecretRegistry {
        &self.secrets
    }

    /// Fetch parameters and build the job environment.
    ///
    /// With `hideSecureStrings` set, secure values are registered before the
    /// environment is returned, so any output produced with it is already
    /// covered.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the query itself is invalid.
    pub async fn set_up<S>(&self, source: &S) -> Result<JobEnvironment, ParameterStoreError>
    where
        S: ParameterSource + ?Sized,
    {
        tracing::debug!(provider = source.provider_name(), "Fetching parameters");
        let parameters = source.fetch(&self.config.query()).await?;

        if self.config.hide_secure_strings {
            let added = self.secrets.add_secure_parameters(&parameters);
            tracing::debug!(added, "Registered secure parameters for redaction");
        }
        tracing::debug!(count = parameters.len(), "Fetched parameters");

        Ok(self.environment(parameters))
    }

    /// Filter to install on the job's output streams
    #[must_use]
    pub fn log_filter(&self) -> LogFilter {
        LogFilter::new(self.secrets.clone())
    }

    fn environment(&self, parameters: Vec<Parameter>) -> JobEnvironment {
        let path = self.config.path.as_deref();
        let mut vars = BTreeMap::new();

        for parameter in parameters {
            match env_var_name(parameter.name(), path, self.config.naming) {
                Some(var) => {
                    let (_, value) = parameter.into_parts();
                    vars.insert(var, value);
                }
                None => {
                    tracing::warn!(
                        name = parameter.name(),
                        "Cannot add parameter to environment"
                    );
                }
            }
        }

        JobEnvironment { vars }
    }
}

//! Job configuration
//!
//! Describes which parameters a job pulls from the store, how they are named
//! in its environment, and whether secure values are hidden from its output.

use crate::{NamingMode, ParameterQuery, ParameterStoreError};
use serde::{Deserialize, Serialize};

/// Region used when neither the configuration nor `AWS_REGION` names one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Name filter option used when none is configured
pub const DEFAULT_OPTION: &str = "BeginsWith";

/// Parameter-store settings for one job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterStoreConfig {
    /// AWS region; falls back to `AWS_REGION`, then [`DEFAULT_REGION`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Hierarchy to fetch, e.g. `/app/prod`. When unset, parameters are
    /// selected by name instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Fetch the whole hierarchy below `path`, not just its direct children
    pub recursive: bool,

    /// Environment variable naming
    pub naming: NamingMode,

    /// Comma separated name filter, used when `path` is unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_prefixes: Option<String>,

    /// Filter option applied to `name_prefixes` (`BeginsWith`, `Equals`, ...)
    pub option: String,

    /// Register `SecureString` values so they are masked in job output
    pub hide_secure_strings: bool,
}

impl Default for ParameterStoreConfig {
    fn default() -> Self {
        Self {
            region: None,
            path: None,
            recursive: false,
            naming: NamingMode::default(),
            name_prefixes: None,
            option: DEFAULT_OPTION.to_string(),
            hide_secure_strings: false,
        }
    }
}

impl ParameterStoreConfig {
    /// Create a configuration that selects every parameter by name
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration.
    ///
    /// Blank strings are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterStoreError::InvalidConfig`] if the JSON does not
    /// describe a configuration.
    pub fn from_json(json: &str) -> Result<Self, ParameterStoreError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ParameterStoreError::InvalidConfig {
                message: e.to_string(),
            })?;
        Ok(config.normalized())
    }

    /// Fetch parameters below `path`
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>, recursive: bool) -> Self {
        self.path = non_blank(Some(path.into()));
        self.recursive = recursive;
        self
    }

    /// Select parameters by comma separated name prefixes
    #[must_use]
    pub fn with_name_prefixes(mut self, prefixes: impl Into<String>) -> Self {
        self.name_prefixes = non_blank(Some(prefixes.into()));
        self
    }

    /// Set the naming mode
    #[must_use]
    pub const fn with_naming(mut self, naming: NamingMode) -> Self {
        self.naming = naming;
        self
    }

    /// Set the region
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = non_blank(Some(region.into()));
        self
    }

    /// Mask secure values in job output
    #[must_use]
    pub const fn hide_secure_strings(mut self, hide: bool) -> Self {
        self.hide_secure_strings = hide;
        self
    }

    /// Effective region
    #[must_use]
    pub fn region(&self) -> String {
        self.region
            .clone()
            .or_else(|| non_blank(std::env::var("AWS_REGION").ok()))
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    /// The query this configuration describes
    #[must_use]
    pub fn query(&self) -> ParameterQuery {
        match &self.path {
            Some(path) => ParameterQuery::ByPath {
                path: path.clone(),
                recursive: self.recursive,
            },
            None => ParameterQuery::ByName {
                prefixes: self
                    .name_prefixes
                    .as_deref()
                    .map(split_prefixes)
                    .unwrap_or_default(),
                option: self.option.clone(),
            },
        }
    }

    fn normalized(mut self) -> Self {
        self.region = non_blank(self.region.take());
        self.path = non_blank(self.path.take());
        self.name_prefixes = non_blank(self.name_prefixes.take());
        if self.option.trim().is_empty() {
            self.option = DEFAULT_OPTION.to_string();
        }
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_prefixes(prefixes: &str) -> Vec<String> {
    prefixes
        .split(',')
        .map(str::trim)
        .filter(|prefix| !prefix.is_empty())
        .map(String::from)
        .collect()
}

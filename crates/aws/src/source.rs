//! Parameter sources
//!
//! [`ParameterSource`] is the seam between a job and wherever its parameters
//! live. [`AwsParameterStore`](crate::AwsParameterStore) talks to AWS;
//! [`StaticParameterSource`] serves a fixed list, which is what tests and
//! local runs use.

use crate::ParameterStoreError;
use async_trait::async_trait;
use paramguard_secrets::Parameter;

/// Which parameters to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterQuery {
    /// Every parameter below a hierarchy
    ByPath {
        /// Hierarchy, e.g. `/app/prod`
        path: String,
        /// Include nested levels, not just direct children
        recursive: bool,
    },
    /// Parameters whose name passes a filter; no prefixes selects everything
    ByName {
        /// Name values to filter on
        prefixes: Vec<String>,
        /// Filter option: `BeginsWith`, `Equals` or `Contains`
        option: String,
    },
}

/// Something parameters can be fetched from.
#[async_trait]
pub trait ParameterSource: Send + Sync {
    /// Fetch every parameter matching `query`, values decrypted.
    async fn fetch(&self, query: &ParameterQuery) -> Result<Vec<Parameter>, ParameterStoreError>;

    /// Identifier used in logs
    fn provider_name(&self) -> &'static str;
}

/// A fixed, in-memory set of parameters.
#[derive(Debug, Clone, Default)]
pub struct StaticParameterSource {
    parameters: Vec<Parameter>,
}

impl StaticParameterSource {
    /// Serve `parameters`
    #[must_use]
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    fn matches(parameter: &Parameter, query: &ParameterQuery) -> Result<bool, ParameterStoreError> {
        let name = parameter.name();
        match query {
            ParameterQuery::ByPath { path, recursive } => {
                let base = path.trim_end_matches('/');
                let Some(rest) = name
                    .strip_prefix(base)
                    .and_then(|rest| rest.strip_prefix('/'))
                else {
                    return Ok(false);
                };
                Ok(!rest.is_empty() && (*recursive || !rest.contains('/')))
            }
            ParameterQuery::ByName { prefixes, .. } if prefixes.is_empty() => Ok(true),
            ParameterQuery::ByName { prefixes, option } => {
                let test: fn(&str, &str) -> bool = match option.as_str() {
                    "BeginsWith" => |name, value| name.starts_with(value),
                    "Equals" => |name, value| name == value,
                    "Contains" => |name, value| name.contains(value),
                    other => {
                        return Err(ParameterStoreError::InvalidFilter {
                            message: format!("unsupported name filter option '{other}'"),
                        });
                    }
                };
                Ok(prefixes.iter().any(|prefix| test(name, prefix)))
            }
        }
    }
}

#[async_trait]
impl ParameterSource for StaticParameterSource {
    async fn fetch(&self, query: &ParameterQuery) -> Result<Vec<Parameter>, ParameterStoreError> {
        let mut selected = Vec::new();
        for parameter in &self.parameters {
            if Self::matches(parameter, query)? {
                selected.push(parameter.clone());
            }
        }
        Ok(selected)
    }

    fn provider_name(&self) -> &'static str {
        "static"
    }
}

//! Environment variable naming
//!
//! Parameter names are hierarchical (`/app/prod/db/password`); environment
//! variable names are not. [`NamingMode`] picks which part of the hierarchy
//! survives, then every character that is neither a letter nor a digit is
//! replaced by `_`. Case is preserved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a parameter's path is turned into an environment variable name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMode {
    /// Last path segment: `/app/prod/db/password` → `password`
    #[default]
    Basename,
    /// Everything below the fetched path: `/app/prod` + `/app/prod/db/password` → `db_password`
    Relative,
    /// The whole path: `/app/prod/db/password` → `app_prod_db_password`
    Absolute,
}

impl NamingMode {
    /// All modes, in display order
    pub const ALL: [Self; 3] = [Self::Basename, Self::Relative, Self::Absolute];

    /// Lowercase name used in configuration
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basename => "basename",
            Self::Relative => "relative",
            Self::Absolute => "absolute",
        }
    }
}

impl fmt::Display for NamingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown naming mode '{s}', expected basename, relative or absolute"))
    }
}

/// Derive an environment variable name for parameter `name`.
///
/// `path` is the hierarchy the parameter was fetched from; without one the
/// mode is ignored and the whole name is used. Returns `None` when nothing is
/// left to name the variable with (e.g. a name ending in `/`).
#[must_use]
pub fn env_var_name(name: &str, path: Option<&str>, mode: NamingMode) -> Option<String> {
    let tail = match path {
        None => name,
        Some(path) => match mode {
            NamingMode::Basename => name.rsplit('/').next().unwrap_or(name),
            NamingMode::Relative => name
                .strip_prefix(path)
                .filter(|rest| !rest.is_empty())
                .unwrap_or(name),
            NamingMode::Absolute => name.strip_prefix('/').unwrap_or(name),
        },
    };
    let tail = tail.strip_prefix('/').unwrap_or(tail);

    let var: String = tail
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    (!var.is_empty()).then_some(var)
}

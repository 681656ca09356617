//! Shared secret registry
//!
//! Holds the plaintext values that must never reach job output. The registry
//! only grows: values are added by the fetch step and read by every
//! [`RedactingWriter`](crate::RedactingWriter) attached to the job.

use crate::Parameter;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Append-only, thread-safe set of secret values.
///
/// Cloning is cheap and yields a handle to the same set, so the fetch step and
/// the output filters can each hold one.
///
/// Empty strings are never stored: an empty alternative would match at every
/// position of every line.
///
/// # Example
///
/// ```
/// use paramguard_secrets::SecretRegistry;
///
/// let registry = SecretRegistry::new();
/// let writer_side = registry.clone();
///
/// registry.add(["password123", "", "password123"]);
/// assert_eq!(writer_side.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct SecretRegistry {
    values: Arc<RwLock<HashSet<String>>>,
}

impl SecretRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register multiple secret values.
    ///
    /// Duplicates and empty strings are skipped. Returns how many values were
    /// not already present.
    pub fn add(&self, values: impl IntoIterator<Item = impl Into<String>>) -> usize {
        let mut set = self.write();
        values
            .into_iter()
            .map(Into::into)
            .filter(|value| !value.is_empty())
            .fold(0, |added, value| added + usize::from(set.insert(value)))
    }

    /// Register a single secret value.
    ///
    /// Returns `true` if the value was not already present.
    pub fn insert(&self, value: impl Into<String>) -> bool {
        let value = value.into();
        !value.is_empty() && self.write().insert(value)
    }

    /// Register the values of every `SecureString` parameter.
    ///
    /// Plain `String` and `StringList` parameters are ignored.
    pub fn add_secure_parameters(&self, parameters: &[Parameter]) -> usize {
        self.add(
            parameters
                .iter()
                .filter(|parameter| parameter.is_secure())
                .map(|parameter| parameter.expose_value().to_owned()),
        )
    }

    /// Copy of the current contents.
    ///
    /// Values registered after the copy is taken are not reflected in it.
    #[must_use]
    pub fn snapshot(&self) -> HashSet<String> {
        self.read().clone()
    }

    /// Number of registered secrets
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if no secrets are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Check whether `value` is registered
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.read().contains(value)
    }

    // A panic while holding the lock cannot leave the set half-modified in a
    // way that matters here (insert either happened or not), so poisoning is
    // ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashSet<String>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashSet<String>> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SecretRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRegistry")
            .field("len", &self.len())
            .finish()
    }
}

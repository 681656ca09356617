//! Log filter factory
//!
//! The host creates one [`LogFilter`] per job and calls
//! [`decorate`](LogFilter::decorate) for each raw output sink it owns.

use crate::{LogSink, RedactingWriter, SecretRegistry};

/// Produces [`RedactingWriter`]s bound to a job's secret registry.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    secrets: SecretRegistry,
}

impl LogFilter {
    /// Create a filter over `secrets`
    #[must_use]
    pub const fn new(secrets: SecretRegistry) -> Self {
        Self { secrets }
    }

    /// Registry shared by every writer this filter creates
    #[must_use]
    pub const fn secrets(&self) -> &SecretRegistry {
        &self.secrets
    }

    /// Wrap a raw output sink.
    ///
    /// The returned writer honours the same write/flush/close contract as
    /// `sink` and masks secrets line by line.
    #[must_use]
    pub fn decorate<W: LogSink>(&self, sink: W) -> RedactingWriter<W> {
        RedactingWriter::new(sink, self.secrets.clone())
    }
}

//! Secret Redaction for paramguard
//!
//! Keeps secure parameter values out of job output. Values fetched from the
//! parameter store are collected in a shared [`SecretRegistry`]; every output
//! stream of the job is wrapped in a [`RedactingWriter`] that masks those
//! values line by line.
//!
//! # Usage
//!
//! ```
//! use paramguard_secrets::{LogFilter, LogSink, SecretRegistry};
//! use std::io::Write;
//!
//! let secrets = SecretRegistry::new();
//! secrets.add(["s3cr3t"]);
//!
//! let filter = LogFilter::new(secrets);
//! let mut out = filter.decorate(Vec::new());
//! out.write_all(b"token=s3cr3t end\n").unwrap();
//! out.close().unwrap();
//!
//! assert_eq!(
//!     out.get_ref().as_slice(),
//!     b"----- Now Redacting 1 Secrets -----\ntoken=******** end\n"
//! );
//! ```
//!
//! The registry may keep growing while output is being produced; a writer
//! picks up new secrets at the next line boundary.

mod filter;
mod parameter;
mod pattern;
mod registry;
mod sink;
mod writer;

pub use filter::LogFilter;
pub use parameter::{Parameter, ParameterType};
pub use pattern::RedactionPattern;
pub use registry::SecretRegistry;
pub use sink::LogSink;
pub use writer::RedactingWriter;

use thiserror::Error;

/// Replacement written in place of every secret occurrence.
pub const MASK: &str = "********";

/// Error types for redaction
#[derive(Debug, Error)]
pub enum RedactionError {
    /// The alternation over all secrets could not be compiled
    #[error("Failed to compile redaction pattern for {count} secrets: {source}")]
    Pattern {
        /// Number of secrets the pattern was built from
        count: usize,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },
}

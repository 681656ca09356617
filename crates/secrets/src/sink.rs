//! Output sinks that can be closed explicitly.

use std::fs::File;
use std::io::{self, Write};

/// A byte sink with an explicit end of life.
///
/// `Write` covers write and flush; `close` is the teardown signal the host
/// sends when a job's output stream ends. The default flushes.
pub trait LogSink: Write {
    /// Release the sink. Wrappers call this at most once.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while flushing or releasing the sink.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl LogSink for Vec<u8> {}

impl LogSink for io::Sink {}

impl LogSink for io::Stdout {}

impl LogSink for io::Stderr {}

impl LogSink for File {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

//! Line-oriented redacting writer
//!
//! [`RedactingWriter`] sits between a job and its log sink. Bytes are
//! collected until a newline; each complete line is redacted against the
//! current contents of the [`SecretRegistry`] and forwarded.
//!
//! The compiled pattern is only rebuilt when the registry size differs from
//! the size it was built from. The registry never shrinks, so a size change is
//! a sufficient staleness signal.

use crate::{LogSink, RedactionPattern, SecretRegistry};
use std::borrow::Cow;
use std::io::{self, Write};

/// Wraps a [`LogSink`], masking every registered secret in the bytes written
/// through it.
///
/// A line is only written to the inner sink once its terminator has been
/// seen, or when the writer is closed. `flush` forwards to the inner sink but
/// does not force out a partial line, because a secret could still be split
/// across it.
///
/// Secrets registered after a line has been emitted do not apply to that line.
pub struct RedactingWriter<W: LogSink> {
    inner: W,
    secrets: SecretRegistry,
    pattern: Option<RedactionPattern>,
    /// Registry size the current pattern was built from
    compiled_count: usize,
    line: Vec<u8>,
    closed: bool,
}

impl<W: LogSink> RedactingWriter<W> {
    /// Wrap `inner`, redacting values from `secrets`
    #[must_use]
    pub fn new(inner: W, secrets: SecretRegistry) -> Self {
        Self {
            inner,
            secrets,
            pattern: None,
            compiled_count: 0,
            line: Vec::new(),
            closed: false,
        }
    }

    /// Reference to the wrapped sink
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutable reference to the wrapped sink.
    ///
    /// Writing to it directly bypasses redaction.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Number of secrets the current pattern redacts
    #[must_use]
    pub fn redacting(&self) -> usize {
        self.pattern
            .as_ref()
            .map_or(0, RedactionPattern::secret_count)
    }

    /// Whether `close` has been called
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Bytes buffered for the current, unterminated line
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.line
    }

    /// Rebuild the pattern if the registry has grown since the last build.
    ///
    /// The new pattern is only kept once its marker line has been written, so
    /// a failure here leaves the writer as it was.
    fn refresh_pattern(&mut self) -> io::Result<()> {
        if self.secrets.len() == self.compiled_count {
            return Ok(());
        }

        let snapshot = self.secrets.snapshot();
        tracing::info!(
            previous = self.compiled_count,
            current = snapshot.len(),
            "Building secret redaction pattern"
        );

        let pattern = RedactionPattern::build(&snapshot).map_err(io::Error::other)?;
        if let Some(pattern) = &pattern {
            let marker = format!(
                "----- Now Redacting {} Secrets -----\n",
                pattern.secret_count()
            );
            self.inner.write_all(marker.as_bytes())?;
        }

        self.pattern = pattern;
        self.compiled_count = snapshot.len();
        Ok(())
    }

    /// Redact and forward the buffered line in a single sink write.
    ///
    /// On error the line stays buffered.
    fn emit_line(&mut self) -> io::Result<()> {
        self.refresh_pattern()?;

        let (content, terminator) = split_terminator(&self.line);
        let redacted = match &self.pattern {
            Some(pattern) => pattern.redact(content),
            None => Cow::Borrowed(content),
        };
        match redacted {
            Cow::Borrowed(_) => self.inner.write_all(&self.line)?,
            Cow::Owned(mut out) => {
                out.extend_from_slice(terminator);
                self.inner.write_all(&out)?;
            }
        }

        self.line.clear();
        Ok(())
    }
}

/// Split a line into its content and its `\n` / `\r\n` terminator.
fn split_terminator(line: &[u8]) -> (&[u8], &[u8]) {
    let split = if line.ends_with(b"\r\n") {
        line.len() - 2
    } else if line.ends_with(b"\n") {
        line.len() - 1
    } else {
        line.len()
    };
    line.split_at(split)
}

impl<W: LogSink> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "redacting writer is closed",
            ));
        }

        // Lines already forwarded count as consumed; an error is only
        // reported when nothing from `buf` made it through.
        let mut consumed = 0;
        let mut rest = buf;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (line, tail) = rest.split_at(pos + 1);
            let buffered = self.line.len();
            self.line.extend_from_slice(line);
            if let Err(e) = self.emit_line() {
                self.line.truncate(buffered);
                return if consumed == 0 { Err(e) } else { Ok(consumed) };
            }
            consumed += line.len();
            rest = tail;
        }
        self.line.extend_from_slice(rest);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.inner.flush()
    }
}

impl<W: LogSink> LogSink for RedactingWriter<W> {
    /// Emit any partial line, then close the inner sink.
    ///
    /// The inner sink is closed exactly once, even when emitting the final
    /// line fails; later calls do nothing.
    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let emitted = if self.line.is_empty() {
            Ok(())
        } else {
            self.emit_line()
        };
        let closed = self.inner.close();
        emitted.and(closed)
    }
}

impl<W: LogSink> Drop for RedactingWriter<W> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // Errors cannot be reported from drop; callers wanting them use close.
        if !self.line.is_empty() {
            let _ = self.emit_line();
        }
        let _ = self.inner.flush();
    }
}

impl<W: LogSink> std::fmt::Debug for RedactingWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedactingWriter")
            .field("redacting", &self.redacting())
            .field("pending", &self.line.len())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

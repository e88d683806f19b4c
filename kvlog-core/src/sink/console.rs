//! Console sink: one rendered line per record on stdout.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::context::Context;
use crate::env::ProcessEnv;
use crate::error::{LogError, LogResult};
use crate::field::Field;
use crate::handler::Handler;
use crate::level::Level;
use crate::sink::pattern::{Render, DEFAULT_PATTERN};

struct Inner {
    writer: Box<dyn Write + Send>,
    render: Render,
}

/// Writes rendered records to stdout or any other writer.
pub struct ConsoleHandler {
    inner: Mutex<Inner>,
}

impl ConsoleHandler {
    /// Console handler writing to stdout with the default pattern.
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Mutex::new(Inner {
                writer: Box::new(writer),
                render: Render::new(DEFAULT_PATTERN, ProcessEnv::from_env()),
            }),
        }
    }
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for ConsoleHandler {
    fn name(&self) -> &str {
        "stdout"
    }

    fn log(&self, ctx: &Context, level: Level, fields: &[Field]) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let line = inner.render.render(ctx, level, fields);
        if let Err(e) = writeln!(inner.writer, "{}", line) {
            tracing::warn!(sink = "stdout", error = %e, "failed to write log record");
        }
    }

    fn set_format(&self, format: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.render.set_pattern(format);
    }

    fn close(&self) -> LogResult<()> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .writer
            .flush()
            .map_err(|e| LogError::close(self.name(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::kv;
    use std::sync::Arc;

    /// Writer that appends into a shared buffer.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_writes_one_line_per_record() {
        let buf = SharedBuf::default();
        let h = ConsoleHandler::with_writer(buf.clone());
        h.set_format("%L %M");
        h.log(&Context::background(), Level::Info, &[kv("log", "first")]);
        h.log(
            &Context::background(),
            Level::Error,
            &[kv("log", "second"), kv("code", 500)],
        );
        assert_eq!(buf.text(), "INFO first\nERROR code=500 second\n");
        assert!(h.close().is_ok());
    }
}

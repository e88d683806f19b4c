//! The handler contract and the composite handler that fans out to sinks.
//!
//! ```text
//! Level API
//!     → Handlers::log   (mask sensitive fields, add time/level/identity)
//!         → ConsoleHandler::log
//!         → FileHandler::log
//! ```

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;

use crate::context::Context;
use crate::error::LogResult;
use crate::field::{kv, Field};
use crate::level::Level;
use crate::value::Value;

/// Key of the formatted message field.
pub const KEY_LOG: &str = "log";
/// Key of the call-site field (`file:line`).
pub const KEY_SOURCE: &str = "source";
pub const KEY_TIME: &str = "time";
pub const KEY_LEVEL: &str = "level";
pub const KEY_LEVEL_VALUE: &str = "level_value";
pub const KEY_APP_ID: &str = "app_id";
pub const KEY_INSTANCE_ID: &str = "instance_id";

/// Value substituted for sensitive fields.
pub const MASK: &str = "***";

/// A destination for log records.
///
/// Implementations must tolerate concurrent calls; all methods take `&self`.
pub trait Handler: Send + Sync {
    /// Short name used in diagnostics (`"stdout"`, `"file"`, ...).
    fn name(&self) -> &str;

    fn log(&self, ctx: &Context, level: Level, fields: &[Field]);

    /// Sets the output pattern. Sinks that do not render text ignore it.
    fn set_format(&self, format: &str);

    fn close(&self) -> LogResult<()>;
}

/// Fans records out to an ordered list of child handlers.
///
/// Sensitive fields are masked before any child sees them. Once closed the
/// composite drops every further call.
pub struct Handlers {
    filters: HashSet<String>,
    handlers: Vec<Box<dyn Handler>>,
    family: String,
    host: String,
    closed: AtomicBool,
}

impl Handlers {
    pub fn new<I, S>(filters: I, handlers: Vec<Box<dyn Handler>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            filters: filters.into_iter().map(Into::into).collect(),
            handlers,
            family: String::new(),
            host: String::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Identity fields appended to every record when non-empty.
    pub fn with_identity(mut self, family: impl Into<String>, host: impl Into<String>) -> Self {
        self.family = family.into();
        self.host = host.into();
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Names of the child handlers in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn is_sensitive(&self, key: &str) -> bool {
        self.filters.contains(key)
    }

    fn enrich(&self, level: Level, fields: &[Field]) -> Vec<Field> {
        let mut out = Vec::with_capacity(fields.len() + 5);
        out.extend(fields.iter().map(|f| {
            if self.is_sensitive(&f.key) {
                Field {
                    key: f.key.clone(),
                    value: Value::from(MASK),
                }
            } else {
                f.clone()
            }
        }));
        out.push(kv(KEY_TIME, Utc::now()));
        out.push(kv(KEY_LEVEL, level.as_str()));
        out.push(kv(KEY_LEVEL_VALUE, level.value()));
        if !self.family.is_empty() {
            out.push(kv(KEY_APP_ID, self.family.as_str()));
        }
        if !self.host.is_empty() {
            out.push(kv(KEY_INSTANCE_ID, self.host.as_str()));
        }
        out
    }
}

impl Handler for Handlers {
    fn name(&self) -> &str {
        "handlers"
    }

    fn log(&self, ctx: &Context, level: Level, fields: &[Field]) {
        if self.is_closed() || self.handlers.is_empty() {
            return;
        }
        let fields = self.enrich(level, fields);
        for h in &self.handlers {
            h.log(ctx, level, &fields);
        }
    }

    fn set_format(&self, format: &str) {
        if self.is_closed() {
            return;
        }
        for h in &self.handlers {
            h.set_format(format);
        }
    }

    fn close(&self) -> LogResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut first = None;
        for h in &self.handlers {
            if let Err(e) = h.close() {
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers")
            .field("handlers", &self.names())
            .field("filters", &self.filters)
            .field("closed", &self.is_closed())
            .finish()
    }
}

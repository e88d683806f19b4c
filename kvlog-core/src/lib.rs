//! kvlog-core: structured, leveled logging facade
//!
//! Call sites log through one process-wide API; records are enriched, masked
//! and fanned out to any number of sinks behind a single composite handler.
//!
//! # Features
//!
//! - **Four call shapes per level**: formatted, formatted with a context,
//!   pre-built fields, and alternating key/value arguments
//! - **Typed fields**: every supported value type has its own encoder method
//! - **Redaction**: values of configured field names are replaced with `***`
//! - **Per-module verbosity**: `v(n)` gates records by a glob table over
//!   source file names
//! - **Sinks**: console and size-rotated per-level files, selected by config
//! - **TOML config**: the `[log]` table of an application config file
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use kvlog_core::prelude::*;
//!
//! kvlog_core::init(None)?;
//! kvlog_core::info!("server started on {}", addr);
//! kvlog_core::infow(&Context::background(), kvs!["user", "alice", "password", pw]);
//! kvlog_core::close()?;
//! ```
//!
//! # Module Organization
//!
//! - [`facade`]: global state, `init`/`close` and the level API
//! - [`handler`]: the [`Handler`] trait and the [`Handlers`] composite
//! - [`field`] / [`value`]: typed key/value pairs and their encoder contract
//! - [`encoder`]: text and JSON encoders
//! - [`filter`]: sensitive-field list and module-verbosity table
//! - [`config`]: [`Config`], environment [`Defaults`] and TOML loading
//! - [`sink`]: console and file sinks
//! - [`error`]: typed error handling

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod encoder;
pub mod env;
pub mod error;
pub mod facade;
pub mod field;
pub mod filter;
pub mod handler;
pub mod level;
pub mod prelude;
pub mod sink;
pub mod value;
pub mod xtime;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{IoResultExt, LogError, LogResult};

// Configuration
pub use config::{load_config, parse_bool, Config, Defaults};
pub use filter::{ModuleVerbosity, SensitiveFields};

// Facade
pub use facade::{
    close, config, error, errorc, errorv, errorw, info, infoc, infov, infow, init,
    init_with_defaults, set_format, v, warn, warnc, warnv, warnw, Verbose,
};

// Records
pub use context::Context;
pub use field::{kv, Field, ObjectEncoder};
pub use level::Level;
pub use value::{Complex, Complex128, Complex64, Reflect, Uintptr, Value};
pub use xtime::{Duration, Time};

// Encoders
pub use encoder::{JsonEncoder, TextEncoder};

// Handlers and sinks
pub use handler::{Handler, Handlers, MASK};
pub use sink::{ConsoleHandler, FileHandler, Render, DEFAULT_PATTERN};

// Diagnostics
pub use diagnostics::init_diagnostics;

// Process identity
pub use env::ProcessEnv;

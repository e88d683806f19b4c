//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use kvlog_core::prelude::*;
//! ```
//!
//! Brings in the record types and the macros. The level functions stay
//! behind the crate path (`kvlog_core::info(..)`) so they do not shadow
//! other `info`/`warn`/`error` names in scope.

pub use crate::config::{Config, Defaults};
pub use crate::context::Context;
pub use crate::error::{LogError, LogResult};
pub use crate::field::{kv, Field};
pub use crate::handler::{Handler, Handlers};
pub use crate::level::Level;
pub use crate::value::Value;

pub use crate::{errorc, infoc, kvs, warnc};

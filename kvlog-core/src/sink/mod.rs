//! Reference sinks.
//!
//! # Data Flow
//! ```text
//! Handlers (composite)
//!     → console.rs (stdout, one line per record)
//!     → file.rs    (info/warning/error files, size rotation)
//!
//! Both render text through pattern.rs; set_format swaps the pattern.
//! ```

pub mod console;
pub mod file;
pub mod pattern;

pub use console::ConsoleHandler;
pub use file::FileHandler;
pub use pattern::{Render, DEFAULT_PATTERN};

//! Process-wide logger state and the level API.
//!
//! The active handler and the last-applied config live together in one
//! snapshot behind an [`ArcSwap`]. Logging calls load the snapshot without
//! locking; only [`init`] and [`close`] replace it.
//!
//! ```rust,ignore
//! use kvlog_core::prelude::*;
//!
//! kvlog_core::init(None)?;
//! kvlog_core::info!("listening on {}", addr);
//! kvlog_core::infow(&ctx, kvs!["user", "alice", "attempts", 3]);
//! kvlog_core::close()?;
//! ```

use std::fmt;
use std::panic::Location;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use crate::config::{Config, Defaults};
use crate::context::Context;
use crate::env::{os_hostname, ProcessEnv};
use crate::error::LogResult;
use crate::field::{kv, Field};
use crate::handler::{Handler, Handlers, KEY_LOG, KEY_SOURCE};
use crate::level::Level;
use crate::sink::{ConsoleHandler, FileHandler};
use crate::value::Value;

struct State {
    handler: Handlers,
    config: Option<Arc<Config>>,
}

impl State {
    /// Console-only handler used before `init` and after `close`.
    fn fallback(config: Option<Arc<Config>>) -> Self {
        Self {
            handler: Handlers::new(Vec::<String>::new(), vec![Box::new(ConsoleHandler::new())]),
            config,
        }
    }
}

fn state() -> &'static ArcSwap<State> {
    static STATE: OnceLock<ArcSwap<State>> = OnceLock::new();
    STATE.get_or_init(|| ArcSwap::from_pointee(State::fallback(None)))
}

fn env_defaults() -> &'static Defaults {
    static DEFAULTS: OnceLock<Defaults> = OnceLock::new();
    DEFAULTS.get_or_init(Defaults::from_env)
}

/// Installs a logger built from `config`, or from `LOG_*` defaults when `None`.
///
/// With `None` the console sink is always enabled. The previous handler is
/// replaced but not closed; call [`close`] first if it holds resources.
pub fn init(config: Option<Config>) -> LogResult<()> {
    init_with_defaults(config, env_defaults())
}

/// Same as [`init`], with defaults resolved by the caller (e.g. from flags).
pub fn init_with_defaults(config: Option<Config>, defaults: &Defaults) -> LogResult<()> {
    let synthesized = config.is_none();
    let mut config = config.unwrap_or_else(|| defaults.to_config());
    apply_identity(&mut config, &ProcessEnv::from_env());

    let handler = build_handlers(&config, synthesized)?;
    tracing::debug!(
        handlers = ?handler.names(),
        family = %config.family,
        host = %config.host,
        "log handler installed"
    );
    state().store(Arc::new(State {
        handler,
        config: Some(Arc::new(config)),
    }));
    Ok(())
}

fn apply_identity(config: &mut Config, env: &ProcessEnv) {
    if !env.app_id.is_empty() {
        config.family = env.app_id.clone();
    }
    if config.host.is_empty() {
        config.host = env.hostname.clone();
    }
    if config.host.is_empty() {
        config.host = os_hostname();
    }
}

/// Builds the composite: console first (if enabled), then file (if `dir`).
pub(crate) fn build_handlers(config: &Config, synthesized: bool) -> LogResult<Handlers> {
    let mut children: Vec<Box<dyn Handler>> = Vec::new();
    if synthesized || config.stdout {
        children.push(Box::new(ConsoleHandler::new()));
    }
    if !config.dir.is_empty() {
        children.push(Box::new(FileHandler::new(
            &config.dir,
            config.file_buffer_size,
            config.rotate_size,
            config.max_log_file,
        )?));
    }
    Ok(Handlers::new(config.filter.iter(), children)
        .with_identity(config.family.as_str(), config.host.as_str()))
}

/// Closes every sink of the active handler and falls back to the console.
///
/// Returns the first close error. Logging stays safe afterwards.
pub fn close() -> LogResult<()> {
    let previous = state().rcu(|current| State::fallback(current.config.clone()));
    previous.handler.close()
}

/// Forwards an output pattern to every sink, unchanged.
pub fn set_format(format: &str) {
    state().load().handler.set_format(format);
}

/// The config applied by the last successful [`init`].
pub fn config() -> Option<Arc<Config>> {
    state().load().config.clone()
}

/// Swaps in `handler` and returns the child names of the one it replaced.
#[cfg(test)]
pub(crate) fn install(handler: Handlers, config: Option<Config>) -> Vec<String> {
    let previous = state().swap(Arc::new(State {
        handler,
        config: config.map(Arc::new),
    }));
    previous
        .handler
        .names()
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
pub(crate) fn handler_names() -> Vec<String> {
    state()
        .load()
        .handler
        .names()
        .into_iter()
        .map(String::from)
        .collect()
}

#[track_caller]
fn emit(ctx: &Context, level: Level, mut fields: Vec<Field>) {
    if !fields.iter().any(|f| f.key == KEY_SOURCE) {
        let loc = Location::caller();
        fields.push(kv(KEY_SOURCE, format!("{}:{}", loc.file(), loc.line())));
    }
    state().load().handler.log(ctx, level, &fields);
}

/// Converts alternating key/value arguments into fields.
///
/// An odd trailing argument and pairs with a non-string key are dropped,
/// each with a warning record.
#[track_caller]
fn logw(args: Vec<Value>) -> Vec<Field> {
    if args.len() % 2 != 0 {
        warn(format_args!(
            "log: the variadic must be plural, the last one will ignored"
        ));
    }
    let mut fields = Vec::with_capacity(args.len() / 2);
    let mut iter = args.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        match key {
            Value::Str(key) => fields.push(Field { key, value }),
            other => warn(format_args!(
                "log: key must be string, get {}, ignored",
                other.type_name()
            )),
        }
    }
    fields
}

macro_rules! level_fns {
    ($level:expr, $plain:ident, $ctx:ident, $structured:ident, $keyword:ident) => {
        #[doc = concat!("Logs a formatted message at ", stringify!($level), ".")]
        #[track_caller]
        pub fn $plain(args: fmt::Arguments<'_>) {
            emit(&Context::background(), $level, vec![kv(KEY_LOG, args)]);
        }

        #[doc = concat!("Logs a formatted message at ", stringify!($level), " with a context.")]
        #[track_caller]
        pub fn $ctx(ctx: &Context, args: fmt::Arguments<'_>) {
            emit(ctx, $level, vec![kv(KEY_LOG, args)]);
        }

        #[doc = concat!("Logs pre-built fields at ", stringify!($level), ".")]
        #[track_caller]
        pub fn $structured(ctx: &Context, fields: impl IntoIterator<Item = Field>) {
            emit(ctx, $level, fields.into_iter().collect());
        }

        #[doc = concat!("Logs alternating key/value arguments at ", stringify!($level), ".")]
        #[track_caller]
        pub fn $keyword(ctx: &Context, args: impl IntoIterator<Item = Value>) {
            let fields = logw(args.into_iter().collect());
            emit(ctx, $level, fields);
        }
    };
}

level_fns!(Level::Info, info, infoc, infov, infow);
level_fns!(Level::Warn, warn, warnc, warnv, warnw);
level_fns!(Level::Error, error, errorc, errorv, errorw);

/// Result of [`v`]: logs at info level only when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verbose(bool);

impl Verbose {
    pub fn enabled(self) -> bool {
        self.0
    }

    #[track_caller]
    pub fn info(self, args: fmt::Arguments<'_>) {
        if self.0 {
            info(args);
        }
    }

    #[track_caller]
    pub fn infov(self, ctx: &Context, fields: impl IntoIterator<Item = Field>) {
        if self.0 {
            infov(ctx, fields);
        }
    }

    #[track_caller]
    pub fn infow(self, ctx: &Context, args: impl IntoIterator<Item = Value>) {
        if self.0 {
            infow(ctx, args);
        }
    }
}

/// Checks whether V-level `level` is enabled for the calling source file.
///
/// Enabled when the global `v` is at least `level`, or when a module pattern
/// matching the caller's file stem maps to at least `level`.
#[track_caller]
pub fn v(level: i32) -> Verbose {
    let module = Path::new(Location::caller().file())
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let snapshot = state().load();
    Verbose(match snapshot.config.as_deref() {
        Some(config) => verbose_enabled(config, &module, level),
        None => level == 0,
    })
}

pub(crate) fn verbose_enabled(config: &Config, module: &str, level: i32) -> bool {
    if level < 0 {
        return false;
    }
    if config.v >= level {
        return true;
    }
    config
        .module
        .level_for(module)
        .is_some_and(|lvl| lvl >= level)
}

/// Formatted message at info level: `info!("fmt", args..)`.
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::info(format_args!($($arg)+)) };
}

/// Formatted message at warn level.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::warn(format_args!($($arg)+)) };
}

/// Formatted message at error level.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::error(format_args!($($arg)+)) };
}

#[macro_export]
macro_rules! infoc {
    ($ctx:expr, $($arg:tt)+) => { $crate::infoc($ctx, format_args!($($arg)+)) };
}

#[macro_export]
macro_rules! warnc {
    ($ctx:expr, $($arg:tt)+) => { $crate::warnc($ctx, format_args!($($arg)+)) };
}

#[macro_export]
macro_rules! errorc {
    ($ctx:expr, $($arg:tt)+) => { $crate::errorc($ctx, format_args!($($arg)+)) };
}

/// Builds the argument list for the keyword calls: `kvs!["user", name, "n", 3]`.
#[macro_export]
macro_rules! kvs {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::Value::from($value)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ModuleVerbosity;

    fn config_with(v: i32, module: &[(&str, i32)]) -> Config {
        Config {
            v,
            module: module.iter().map(|(p, l)| (*p, *l)).collect::<ModuleVerbosity>(),
            ..Config::default()
        }
    }

    #[test]
    fn test_verbose_global_threshold() {
        let c = config_with(2, &[]);
        assert!(verbose_enabled(&c, "anything", 1));
        assert!(verbose_enabled(&c, "anything", 2));
        assert!(!verbose_enabled(&c, "anything", 3));
        assert!(!verbose_enabled(&c, "anything", -1));
    }

    #[test]
    fn test_verbose_module_override() {
        let c = config_with(0, &[("dao*", 3), ("service", 1)]);
        assert!(verbose_enabled(&c, "dao_user", 3));
        assert!(!verbose_enabled(&c, "dao_user", 4));
        assert!(verbose_enabled(&c, "service", 1));
        assert!(!verbose_enabled(&c, "service", 2));
        assert!(!verbose_enabled(&c, "handler", 1));
    }

    #[test]
    fn test_apply_identity() {
        let env = ProcessEnv {
            app_id: "shop.api".into(),
            hostname: "host-7".into(),
            ..ProcessEnv::default()
        };

        let mut c = Config {
            family: "local".into(),
            ..Config::default()
        };
        apply_identity(&mut c, &env);
        assert_eq!(c.family, "shop.api");
        assert_eq!(c.host, "host-7");

        let mut c = Config {
            family: "local".into(),
            host: "pinned".into(),
            ..Config::default()
        };
        apply_identity(&mut c, &ProcessEnv::default());
        assert_eq!(c.family, "local");
        assert_eq!(c.host, "pinned");
    }

    #[test]
    fn test_build_handlers_order() {
        let dir = tempfile::tempdir().unwrap();
        let c = Config {
            stdout: true,
            dir: dir.path().to_string_lossy().into_owned(),
            ..Config::default()
        };
        let hs = build_handlers(&c, false).unwrap();
        assert_eq!(hs.names(), vec!["stdout", "file"]);

        let hs = build_handlers(&Config::default(), false).unwrap();
        assert!(hs.is_empty());

        let hs = build_handlers(&Config::default(), true).unwrap();
        assert_eq!(hs.names(), vec!["stdout"]);
    }
}

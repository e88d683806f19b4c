//! Logging configuration.
//!
//! A [`Config`] is either built by the caller (or loaded from a TOML file with
//! [`load_config`]) or synthesized by `init` from [`Defaults`], which are
//! resolved once from the environment and, in binaries, command-line flags.
//!
//! # Environment Variables
//! - `LOG_V`: default verbosity (integer)
//! - `LOG_STDOUT`: enable the console sink (boolean)
//! - `LOG_DIR`: directory for the file sink
//! - `LOG_MODULE`: per-module verbosity, `pattern=N,pattern2=N`
//! - `LOG_FILTER`: sensitive field names, `field1,field2`

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::LogError;
use crate::filter::{ModuleVerbosity, SensitiveFields};

/// Desired logging behavior, consumed once by `init`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application family; replaced by the process app id when one is set.
    pub family: String,
    /// Instance name; defaults to the process hostname.
    pub host: String,

    /// Enable the console sink.
    pub stdout: bool,

    /// Directory for the file sink; empty disables it.
    pub dir: String,
    /// Write buffer per file, in bytes.
    pub file_buffer_size: i64,
    /// Rotated segments kept per level.
    pub max_log_file: i32,
    /// Size in bytes at which a file is rotated.
    pub rotate_size: i64,

    /// Default V level.
    pub v: i32,
    /// V level per module, e.g. `{"service" = 1, "dao*" = 2}`.
    pub module: ModuleVerbosity,
    /// Field names whose values are masked.
    pub filter: SensitiveFields,
}

/// Process-level defaults taken from environment and flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defaults {
    pub v: i32,
    pub stdout: bool,
    pub dir: String,
    pub module: ModuleVerbosity,
    pub filter: SensitiveFields,
}

impl Defaults {
    /// Reads `LOG_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `LOG_*` variables through `lookup`.
    ///
    /// Unparsable `LOG_V`/`LOG_STDOUT` values fall back to zero/false.
    /// Malformed `LOG_MODULE` entries are reported as warnings and skipped.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut defaults = Self::default();
        if let Some(v) = lookup("LOG_V").and_then(|s| s.trim().parse().ok()) {
            defaults.v = v;
        }
        defaults.stdout = lookup("LOG_STDOUT")
            .and_then(|s| parse_bool(&s))
            .unwrap_or(false);
        defaults.dir = lookup("LOG_DIR").unwrap_or_default();
        if let Some(module) = lookup("LOG_MODULE").filter(|s| !s.is_empty()) {
            defaults.set_module(&module);
        }
        if let Some(filter) = lookup("LOG_FILTER").filter(|s| !s.is_empty()) {
            defaults.filter.set(&filter);
        }
        defaults
    }

    /// Appends module-verbosity entries, warning about malformed ones.
    pub fn set_module(&mut self, value: &str) -> &mut Self {
        for err in self.module.set(value) {
            report_module_error(&err);
        }
        self
    }

    /// Appends sensitive field names.
    pub fn set_filter(&mut self, value: &str) -> &mut Self {
        self.filter.set(value);
        self
    }

    /// The config `init` uses when none is given.
    pub fn to_config(&self) -> Config {
        Config {
            stdout: self.stdout,
            dir: self.dir.clone(),
            v: self.v,
            module: self.module.clone(),
            filter: self.filter.clone(),
            ..Config::default()
        }
    }
}

fn report_module_error(err: &LogError) {
    crate::facade::warn(format_args!("log: ignoring module verbosity: {}", err));
}

/// Parses the boolean spellings accepted for `LOG_STDOUT`.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    log: Option<Config>,
}

/// Loads the `[log]` table from a TOML file.
///
/// Returns `Ok(None)` when the file does not exist or has no `[log]` table.
pub fn load_config(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: ConfigFile =
        toml::from_str(&content).map_err(|e| LogError::config(path, e.message()))?;
    Ok(file.log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |k: &str| map.get(k).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults_from_lookup() {
        let d = Defaults::from_lookup(lookup(&[
            ("LOG_V", "3"),
            ("LOG_STDOUT", "true"),
            ("LOG_DIR", "/var/log/shop"),
            ("LOG_MODULE", "dao*=2,service=1"),
            ("LOG_FILTER", "password, token"),
        ]));
        assert_eq!(d.v, 3);
        assert!(d.stdout);
        assert_eq!(d.dir, "/var/log/shop");
        assert_eq!(d.module.get("dao*"), Some(2));
        assert_eq!(d.filter.as_slice(), ["password", "token"]);
    }

    #[test]
    fn test_defaults_ignore_bad_scalars() {
        let d = Defaults::from_lookup(lookup(&[("LOG_V", "high"), ("LOG_STDOUT", "maybe")]));
        assert_eq!(d.v, 0);
        assert!(!d.stdout);
    }

    #[test]
    fn test_flags_accumulate_on_env() {
        let mut d = Defaults::from_lookup(lookup(&[("LOG_FILTER", "password")]));
        d.set_filter("token").set_module("service=2");
        assert_eq!(d.filter.as_slice(), ["password", "token"]);
        assert_eq!(d.module.get("service"), Some(2));
    }

    #[test]
    fn test_to_config_copies_defaults() {
        let mut d = Defaults::default();
        d.stdout = true;
        d.v = 2;
        d.set_filter("secret");
        let c = d.to_config();
        assert!(c.stdout);
        assert_eq!(c.v, 2);
        assert_eq!(c.filter.as_slice(), ["secret"]);
        assert!(c.family.is_empty());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("T"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_load_config_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(
            &path,
            r#"
[log]
family = "shop.api"
stdout = true
dir = "/tmp/logs"
rotate_size = 1048576
v = 1
filter = ["password", "card"]

[log.module]
"dao*" = 2
service = 1
"#,
        )
        .unwrap();

        let cfg = load_config(&path).unwrap().unwrap();
        assert_eq!(cfg.family, "shop.api");
        assert!(cfg.stdout);
        assert_eq!(cfg.rotate_size, 1_048_576);
        assert_eq!(cfg.module.get("dao*"), Some(2));
        assert_eq!(cfg.module.get("service"), Some(1));
        assert_eq!(cfg.filter.as_slice(), ["password", "card"]);
        assert_eq!(cfg.max_log_file, 0);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("nope.toml")).unwrap().is_none());
    }

    #[test]
    fn test_load_config_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[log]\nv = \"loud\"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.downcast_ref::<LogError>().is_some());
    }
}

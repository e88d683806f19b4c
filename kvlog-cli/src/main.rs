//! kvlog CLI - emit one structured record through the kvlog pipeline.
//!
//! Features:
//! - `log.*` flags seeded from `LOG_*` environment variables
//! - Optional TOML config file (`[log]` table) overriding the flag defaults
//! - `KEY=VALUE` arguments become typed fields (integers, booleans, strings)
//!
//! ```text
//! kvlog --log.stdout --log.filter password --level warn "login failed" user=alice password=hunter2
//! ```

use anyhow::{anyhow, Context as _, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use kvlog_core::{
    close, errorv, infov, init_diagnostics, init_with_defaults, kv, load_config, parse_bool,
    set_format, warnv, Context, Defaults, Field, Value,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Emit a structured log record through kvlog")]
pub struct Cli {
    /// Default V level; falls back to LOG_V, ignored there when not a number
    #[arg(long = "log.v")]
    v: Option<i32>,

    /// Enable the console sink
    #[arg(
        long = "log.stdout",
        env = "LOG_STDOUT",
        action = ArgAction::SetTrue,
        value_parser = lenient_bool
    )]
    stdout: bool,

    /// Directory for the file sink
    #[arg(long = "log.dir", env = "LOG_DIR", default_value = "")]
    dir: String,

    /// Module verbosity, `pattern=N,pattern2=N` (repeatable)
    #[arg(long = "log.module", env = "LOG_MODULE")]
    module: Vec<String>,

    /// Sensitive field names, `field1,field2` (repeatable)
    #[arg(long = "log.filter", env = "LOG_FILTER")]
    filter: Vec<String>,

    /// TOML file whose `[log]` table replaces the flag defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output pattern for the text sinks (e.g. "%L %M")
    #[arg(long)]
    format: Option<String>,

    /// Level of the emitted record
    #[arg(long, value_enum, default_value_t = LevelArg::Info)]
    level: LevelArg,

    /// Message text
    message: String,

    /// Extra fields as KEY=VALUE
    fields: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    Info,
    Warn,
    Error,
}

impl Cli {
    fn defaults(&self) -> Defaults {
        self.defaults_from(|key| std::env::var(key).ok())
    }

    /// Flag values win; `LOG_V` is only consulted when `--log.v` is absent.
    fn defaults_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Defaults {
        let v = self
            .v
            .or_else(|| lookup("LOG_V").and_then(|s| s.trim().parse().ok()))
            .unwrap_or(0);
        let mut defaults = Defaults {
            v,
            stdout: self.stdout,
            dir: self.dir.clone(),
            ..Defaults::default()
        };
        for module in &self.module {
            defaults.set_module(module);
        }
        for filter in &self.filter {
            defaults.set_filter(filter);
        }
        defaults
    }

    fn record(&self) -> Result<Vec<Field>> {
        let mut fields = vec![kv("log", self.message.as_str())];
        for pair in &self.fields {
            fields.push(parse_field(pair)?);
        }
        Ok(fields)
    }
}

/// Boolean spellings accepted by the core; anything else reads as false.
fn lenient_bool(s: &str) -> Result<bool, String> {
    Ok(parse_bool(s).unwrap_or(false))
}

/// Parses `KEY=VALUE`; integers and booleans keep their type.
fn parse_field(pair: &str) -> Result<Field> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("field {:?} is not KEY=VALUE", pair))?;
    if key.is_empty() {
        return Err(anyhow!("field {:?} has an empty key", pair));
    }
    let value = if let Ok(n) = raw.parse::<i64>() {
        Value::from(n)
    } else if let Ok(b) = raw.parse::<bool>() {
        Value::from(b)
    } else {
        Value::from(raw)
    };
    Ok(Field::new(key, value))
}

fn main() -> Result<()> {
    init_diagnostics();

    let cli = Cli::parse();
    let fields = cli.record()?;

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => None,
    };
    init_with_defaults(config, &cli.defaults()).context("failed to initialize logging")?;
    if let Some(format) = &cli.format {
        set_format(format);
    }

    let ctx = Context::background();
    match cli.level {
        LevelArg::Info => infov(&ctx, fields),
        LevelArg::Warn => warnv(&ctx, fields),
        LevelArg::Error => errorv(&ctx, fields),
    }

    close().context("failed to flush log sinks")?;
    Ok(())
}

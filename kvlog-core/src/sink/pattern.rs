//! Output pattern rendering shared by the text sinks.
//!
//! | verb | output |
//! |------|--------|
//! | `%T` | time `15:04:05.999` |
//! | `%t` | time `15:04:05` |
//! | `%D` | date `2006/01/02` |
//! | `%d` | date `01/02` |
//! | `%L` | level (`INFO`, `WARN`, `ERROR`) |
//! | `%M` | fields as `key=value`, then the message |
//! | `%f` | call site `file:line` |
//! | `%i` | instance id |
//! | `%e` | deploy env |
//! | `%z` | zone |
//! | `%S` | full source path and line |
//! | `%s` | final path element and line |
//! | `%%` | a literal `%` |
//!
//! Unknown verbs are written through unchanged.

use chrono::{DateTime, Local, Utc};

use crate::context::Context;
use crate::encoder::TextEncoder;
use crate::env::ProcessEnv;
use crate::field::Field;
use crate::handler::{
    KEY_APP_ID, KEY_INSTANCE_ID, KEY_LEVEL, KEY_LEVEL_VALUE, KEY_LOG, KEY_SOURCE, KEY_TIME,
};
use crate::level::Level;
use crate::value::Value;

/// Pattern used when none has been set.
pub const DEFAULT_PATTERN: &str = "%L %d-%T %f %M";

/// Context key rendered in front of the fields by `%M`.
pub const CTX_TRACE_ID: &str = "trace_id";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Verb(char),
}

/// A compiled output pattern.
#[derive(Debug, Clone)]
pub struct Render {
    tokens: Vec<Token>,
    env: ProcessEnv,
}

impl Render {
    pub fn new(pattern: &str, env: ProcessEnv) -> Self {
        Self {
            tokens: compile(pattern),
            env,
        }
    }

    pub fn set_pattern(&mut self, pattern: &str) {
        self.tokens = compile(pattern);
    }

    /// Renders one record without a trailing newline.
    pub fn render(&self, ctx: &Context, level: Level, fields: &[Field]) -> String {
        let time = fields
            .iter()
            .find_map(|f| match (&f.key[..], &f.value) {
                (KEY_TIME, Value::Time(t)) => Some(*t),
                _ => None,
            })
            .unwrap_or_else(Utc::now)
            .with_timezone(&Local);

        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(s) => out.push_str(s),
                Token::Verb(c) => self.render_verb(&mut out, *c, ctx, level, fields, &time),
            }
        }
        out
    }

    fn render_verb(
        &self,
        out: &mut String,
        verb: char,
        ctx: &Context,
        level: Level,
        fields: &[Field],
        time: &DateTime<Local>,
    ) {
        match verb {
            'T' => out.push_str(&time.format("%H:%M:%S%.3f").to_string()),
            't' => out.push_str(&time.format("%H:%M:%S").to_string()),
            'D' => out.push_str(&time.format("%Y/%m/%d").to_string()),
            'd' => out.push_str(&time.format("%m/%d").to_string()),
            'L' => out.push_str(level.as_str()),
            'M' => out.push_str(&message(ctx, fields)),
            'f' | 'S' => out.push_str(string_field(fields, KEY_SOURCE).unwrap_or("")),
            's' => {
                let source = string_field(fields, KEY_SOURCE).unwrap_or("");
                out.push_str(short_source(source));
            }
            'i' => out.push_str(
                string_field(fields, KEY_INSTANCE_ID).unwrap_or(self.env.hostname.as_str()),
            ),
            'e' => out.push_str(&self.env.deploy_env),
            'z' => out.push_str(&self.env.zone),
            '%' => out.push('%'),
            other => {
                out.push('%');
                out.push(other);
            }
        }
    }
}

fn compile(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        match chars.next() {
            Some(verb) => {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Verb(verb));
            }
            None => literal.push('%'),
        }
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

fn string_field<'a>(fields: &'a [Field], key: &str) -> Option<&'a str> {
    fields.iter().find(|f| f.key == key)?.value.as_str()
}

/// `src/dao/user.rs:42` → `user.rs:42`
fn short_source(source: &str) -> &str {
    source
        .rfind(['/', '\\'])
        .map_or(source, |idx| &source[idx + 1..])
}

fn is_internal(key: &str) -> bool {
    matches!(
        key,
        KEY_LOG | KEY_SOURCE | KEY_TIME | KEY_LEVEL | KEY_LEVEL_VALUE | KEY_APP_ID | KEY_INSTANCE_ID
    )
}

fn message(ctx: &Context, fields: &[Field]) -> String {
    let mut enc = TextEncoder::new();
    if let Some(trace_id) = ctx.value(CTX_TRACE_ID) {
        crate::field::kv(CTX_TRACE_ID, trace_id).add_to(&mut enc);
    }
    for f in fields.iter().filter(|f| !is_internal(&f.key)) {
        f.add_to(&mut enc);
    }
    let mut out = enc.into_string();
    for f in fields.iter().filter(|f| f.key == KEY_LOG) {
        let mut msg = TextEncoder::new();
        f.add_to(&mut msg);
        let text = msg.into_string();
        let text = text.strip_prefix("log=").unwrap_or(&text);
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::kv;

    fn env() -> ProcessEnv {
        ProcessEnv {
            app_id: "shop.api".into(),
            hostname: "host-1".into(),
            deploy_env: "uat".into(),
            zone: "sh001".into(),
        }
    }

    #[test]
    fn test_message_puts_fields_before_text() {
        let render = Render::new("[%L] %M", env());
        let fields = [
            kv("log", "user logged in"),
            kv("user", "alice"),
            kv("level", "INFO"),
        ];
        assert_eq!(
            render.render(&Context::background(), Level::Info, &fields),
            "[INFO] user=alice user logged in"
        );
    }

    #[test]
    fn test_identity_and_source_verbs() {
        let render = Render::new("%i|%e|%z|%S|%s|100%%", env());
        let fields = [kv("source", "src/dao/user.rs:42")];
        assert_eq!(
            render.render(&Context::background(), Level::Warn, &fields),
            "host-1|uat|sh001|src/dao/user.rs:42|user.rs:42|100%"
        );
    }

    #[test]
    fn test_trace_id_from_context() {
        let render = Render::new("%M", env());
        let ctx = Context::background().with_value(CTX_TRACE_ID, "t-1");
        assert_eq!(render.render(&ctx, Level::Info, &[kv("log", "hi")]), "trace_id=t-1 hi");
    }

    #[test]
    fn test_unknown_verb_and_trailing_percent() {
        let render = Render::new("%q %", env());
        assert_eq!(render.render(&Context::background(), Level::Info, &[]), "%q %");
    }

    #[test]
    fn test_set_pattern() {
        let mut render = Render::new(DEFAULT_PATTERN, env());
        render.set_pattern("%L");
        assert_eq!(render.render(&Context::background(), Level::Error, &[]), "ERROR");
    }
}

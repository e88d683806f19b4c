//! Grammars for the two filter lists read from flags and environment.
//!
//! - Sensitive fields: `"password, token"`
//! - Module verbosity: `"service=1,dao*=2"`
//!
//! Both are append-only: every `set` call adds to what is already there.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Field names whose values are masked before reaching any sink.
///
/// Order is irrelevant and duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensitiveFields(Vec<String>);

impl SensitiveFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every comma-separated token of `value`, trimmed.
    ///
    /// Empty tokens are kept: `"a,,b"` appends `"a"`, `""` and `"b"`.
    pub fn set(&mut self, value: &str) {
        self.0
            .extend(value.split(',').map(|token| token.trim().to_string()));
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SensitiveFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for SensitiveFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

/// Per-module verbosity overrides keyed by pattern.
///
/// A pattern is either a literal module name (`"service"`) or a trailing
/// glob (`"dao*"`) matching every module whose name starts with `dao`.
/// Setting a pattern that already exists replaces its level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleVerbosity(BTreeMap<String, i32>);

impl ModuleVerbosity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `pattern=level` tokens separated by commas and inserts each one.
    ///
    /// Malformed tokens are skipped; one error per skipped token is returned
    /// so the caller can report them. Empty tokens are ignored silently.
    pub fn set(&mut self, value: &str) -> Vec<LogError> {
        let mut errors = Vec::new();
        for token in value.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match parse_module_token(token) {
                Ok((pattern, level)) => {
                    self.0.insert(pattern.to_string(), level);
                }
                Err(e) => errors.push(e),
            }
        }
        errors
    }

    pub fn insert(&mut self, pattern: impl Into<String>, level: i32) {
        self.0.insert(pattern.into(), level);
    }

    pub fn get(&self, pattern: &str) -> Option<i32> {
        self.0.get(pattern).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Resolves the verbosity configured for `module`.
    ///
    /// A literal pattern equal to `module` wins; otherwise the glob with the
    /// longest matching prefix. `None` means no pattern applies.
    pub fn level_for(&self, module: &str) -> Option<i32> {
        if let Some(level) = self.0.get(module) {
            return Some(*level);
        }
        self.0
            .iter()
            .filter_map(|(pattern, level)| {
                let prefix = pattern.strip_suffix('*')?;
                module.starts_with(prefix).then_some((prefix.len(), *level))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, level)| level)
    }
}

impl<S: Into<String>> FromIterator<(S, i32)> for ModuleVerbosity {
    fn from_iter<I: IntoIterator<Item = (S, i32)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Display for ModuleVerbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (pattern, level)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}={}", pattern, level)?;
        }
        Ok(())
    }
}

fn parse_module_token(token: &str) -> Result<(&str, i32), LogError> {
    let (pattern, level) = token
        .split_once('=')
        .ok_or_else(|| LogError::invalid_module(token, "expected pattern=level"))?;
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(LogError::invalid_module(token, "empty pattern"));
    }
    let level = level
        .trim()
        .parse::<i32>()
        .map_err(|e| LogError::invalid_module(token, e.to_string()))?;
    Ok((pattern, level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_fields_trim() {
        let mut f = SensitiveFields::new();
        f.set("a, b ,c");
        assert_eq!(f.as_slice(), ["a", "b", "c"]);
    }

    #[test]
    fn test_sensitive_fields_keep_empty_tokens() {
        let mut f = SensitiveFields::new();
        f.set("a,, b");
        assert_eq!(f.as_slice(), ["a", "", "b"]);
    }

    #[test]
    fn test_sensitive_fields_accumulate() {
        let mut f = SensitiveFields::new();
        f.set("password");
        f.set("token,password");
        assert_eq!(f.as_slice(), ["password", "token", "password"]);
        assert_eq!(f.to_string(), "password,token,password");
    }

    #[test]
    fn test_module_parse() {
        let mut m = ModuleVerbosity::new();
        let errors = m.set("dao*=2,service=1");
        assert!(errors.is_empty());
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("dao*"), Some(2));
        assert_eq!(m.get("service"), Some(1));
    }

    #[test]
    fn test_module_skips_malformed() {
        let mut m = ModuleVerbosity::new();
        let errors = m.set("bad,service=1,dao=x, =3");
        assert_eq!(errors.len(), 3);
        assert!(matches!(&errors[0], LogError::InvalidModule { token, .. } if token == "bad"));
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("service"), Some(1));
    }

    #[test]
    fn test_module_last_write_wins() {
        let mut m = ModuleVerbosity::new();
        m.set("service=1");
        m.set("service=4");
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("service"), Some(4));
    }

    #[test]
    fn test_level_for_precedence() {
        let m: ModuleVerbosity = [("dao*", 2), ("dao_user*", 5), ("dao_order", 1)]
            .into_iter()
            .collect();
        assert_eq!(m.level_for("dao_order"), Some(1));
        assert_eq!(m.level_for("dao_user_cache"), Some(5));
        assert_eq!(m.level_for("dao_item"), Some(2));
        assert_eq!(m.level_for("service"), None);
    }

    #[test]
    fn test_module_display() {
        let m: ModuleVerbosity = [("service", 1), ("dao*", 2)].into_iter().collect();
        assert_eq!(m.to_string(), "dao*=2,service=1");
    }
}

//! Config-friendly time wrappers.
//!
//! `Duration` deserializes from strings such as `"300ms"` or `"1h30m"`, and
//! `Time` is a unix timestamp in seconds. Both normalize to the std/chrono
//! types before they are encoded into a log record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(pub i64);

impl Time {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    /// Converts to a chrono timestamp. Out-of-range values clamp to the epoch.
    pub fn time(self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.0, 0)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// A duration written in humantime form, e.g. `"300ms"` or `"1h 30m"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration(#[serde(with = "humantime_serde")] pub std::time::Duration);

impl Duration {
    pub fn as_std(self) -> std::time::Duration {
        self.0
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Self(d)
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        d.0
    }
}

impl FromStr for Duration {
    type Err = humantime::DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        humantime::parse_duration(s.trim()).map(Self)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", humantime::format_duration(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn test_parse_simple_units() {
        assert_eq!("300ms".parse::<Duration>().unwrap().0, StdDuration::from_millis(300));
        assert_eq!("2s".parse::<Duration>().unwrap().0, StdDuration::from_secs(2));
        assert_eq!("1s 500ms".parse::<Duration>().unwrap().0, StdDuration::from_millis(1500));
    }

    #[test]
    fn test_parse_compound() {
        let d: Duration = "1h30m".parse().unwrap();
        assert_eq!(d.0, StdDuration::from_secs(5400));
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Duration>().is_err());
        assert!("10".parse::<Duration>().is_err());
        assert!("5parsecs".parse::<Duration>().is_err());
    }

    #[test]
    fn test_parse_large_values_exact_or_rejected() {
        let d: Duration = "9999999999999h".parse().unwrap();
        assert_eq!(d.0, StdDuration::from_secs(9_999_999_999_999 * 3600));
        assert!("99999999999999999999s".parse::<Duration>().is_err());
        assert!("9999999999999999999h".parse::<Duration>().is_err());
    }

    #[test]
    fn test_serde_humantime_form() {
        #[derive(Debug, Deserialize, Serialize)]
        struct Wrapper {
            flush: Duration,
        }

        let w: Wrapper = toml::from_str("flush = \"1m 5s\"").unwrap();
        assert_eq!(w.flush.0, StdDuration::from_secs(65));
        assert!(toml::from_str::<Wrapper>("flush = \"soon\"").is_err());
        assert_eq!(toml::to_string(&w).unwrap().trim(), "flush = \"1m 5s\"");
        assert_eq!(w.flush.to_string(), "1m 5s");
    }

    #[test]
    fn test_time_normalizes() {
        assert_eq!(Time(0).time(), DateTime::UNIX_EPOCH);
        assert_eq!(Time(86_400).time().timestamp(), 86_400);
    }
}

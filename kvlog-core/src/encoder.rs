//! Concrete [`ObjectEncoder`] implementations.
//!
//! - [`TextEncoder`]: `key=value` pairs separated by spaces, used by the sinks
//! - [`JsonEncoder`]: builds a `serde_json::Map`

use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value as Json};

use crate::field::ObjectEncoder;
use crate::value::{Complex128, Complex64, Reflect};

/// Renders fields as `key=value` text.
#[derive(Debug, Default)]
pub struct TextEncoder {
    buf: String,
}

impl TextEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    fn push(&mut self, key: &str, value: impl std::fmt::Display) {
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }
        let _ = write!(self.buf, "{}={}", key, value);
    }
}

impl ObjectEncoder for TextEncoder {
    fn add_bool(&mut self, key: &str, value: bool) {
        self.push(key, value);
    }

    fn add_complex128(&mut self, key: &str, value: Complex128) {
        self.push(key, value);
    }

    fn add_complex64(&mut self, key: &str, value: Complex64) {
        self.push(key, value);
    }

    fn add_f64(&mut self, key: &str, value: f64) {
        self.push(key, value);
    }

    fn add_f32(&mut self, key: &str, value: f32) {
        self.push(key, value);
    }

    fn add_isize(&mut self, key: &str, value: isize) {
        self.push(key, value);
    }

    fn add_i64(&mut self, key: &str, value: i64) {
        self.push(key, value);
    }

    fn add_i32(&mut self, key: &str, value: i32) {
        self.push(key, value);
    }

    fn add_i16(&mut self, key: &str, value: i16) {
        self.push(key, value);
    }

    fn add_i8(&mut self, key: &str, value: i8) {
        self.push(key, value);
    }

    fn add_str(&mut self, key: &str, value: &str) {
        self.push(key, value);
    }

    fn add_usize(&mut self, key: &str, value: usize) {
        self.push(key, value);
    }

    fn add_u64(&mut self, key: &str, value: u64) {
        self.push(key, value);
    }

    fn add_u32(&mut self, key: &str, value: u32) {
        self.push(key, value);
    }

    fn add_u16(&mut self, key: &str, value: u16) {
        self.push(key, value);
    }

    fn add_u8(&mut self, key: &str, value: u8) {
        self.push(key, value);
    }

    fn add_byte_string(&mut self, key: &str, value: &[u8]) {
        self.push(key, String::from_utf8_lossy(value));
    }

    fn add_uintptr(&mut self, key: &str, value: usize) {
        self.push(key, format_args!("{:#x}", value));
    }

    fn add_time(&mut self, key: &str, value: DateTime<Utc>) {
        self.push(key, value.to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    fn add_duration(&mut self, key: &str, value: Duration) {
        self.push(key, format_args!("{:?}", value));
    }

    fn add_reflected(&mut self, key: &str, value: &dyn Reflect) -> Result<(), String> {
        let json = value.reflect().map_err(|e| e.to_string())?;
        self.push(key, json);
        Ok(())
    }
}

/// Collects fields into a JSON object.
#[derive(Debug, Default)]
pub struct JsonEncoder {
    map: Map<String, Json>,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_map(self) -> Map<String, Json> {
        self.map
    }

    fn insert(&mut self, key: &str, value: impl Into<Json>) {
        self.map.insert(key.to_string(), value.into());
    }
}

impl ObjectEncoder for JsonEncoder {
    fn add_bool(&mut self, key: &str, value: bool) {
        self.insert(key, value);
    }

    fn add_complex128(&mut self, key: &str, value: Complex128) {
        self.insert(key, value.to_string());
    }

    fn add_complex64(&mut self, key: &str, value: Complex64) {
        self.insert(key, value.to_string());
    }

    fn add_f64(&mut self, key: &str, value: f64) {
        self.insert(key, value);
    }

    fn add_f32(&mut self, key: &str, value: f32) {
        self.insert(key, value);
    }

    fn add_isize(&mut self, key: &str, value: isize) {
        self.insert(key, value);
    }

    fn add_i64(&mut self, key: &str, value: i64) {
        self.insert(key, value);
    }

    fn add_i32(&mut self, key: &str, value: i32) {
        self.insert(key, value);
    }

    fn add_i16(&mut self, key: &str, value: i16) {
        self.insert(key, value);
    }

    fn add_i8(&mut self, key: &str, value: i8) {
        self.insert(key, value);
    }

    fn add_str(&mut self, key: &str, value: &str) {
        self.insert(key, value);
    }

    fn add_usize(&mut self, key: &str, value: usize) {
        self.insert(key, value);
    }

    fn add_u64(&mut self, key: &str, value: u64) {
        self.insert(key, value);
    }

    fn add_u32(&mut self, key: &str, value: u32) {
        self.insert(key, value);
    }

    fn add_u16(&mut self, key: &str, value: u16) {
        self.insert(key, value);
    }

    fn add_u8(&mut self, key: &str, value: u8) {
        self.insert(key, value);
    }

    fn add_byte_string(&mut self, key: &str, value: &[u8]) {
        self.insert(key, String::from_utf8_lossy(value).into_owned());
    }

    fn add_uintptr(&mut self, key: &str, value: usize) {
        self.insert(key, value);
    }

    fn add_time(&mut self, key: &str, value: DateTime<Utc>) {
        self.insert(key, value.to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    fn add_duration(&mut self, key: &str, value: Duration) {
        self.insert(key, format!("{:?}", value));
    }

    fn add_reflected(&mut self, key: &str, value: &dyn Reflect) -> Result<(), String> {
        let json = value.reflect().map_err(|e| e.to_string())?;
        self.insert(key, json);
        Ok(())
    }
}

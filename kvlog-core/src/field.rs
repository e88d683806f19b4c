//! Log fields and the encoder capability they write into.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::value::{Complex128, Complex64, Reflect, Value};

/// Structured sink for one record's fields.
///
/// Every method adds one named entry. Only [`add_reflected`](Self::add_reflected)
/// can fail, for values the generic path cannot represent.
pub trait ObjectEncoder {
    fn add_bool(&mut self, key: &str, value: bool);
    fn add_complex128(&mut self, key: &str, value: Complex128);
    fn add_complex64(&mut self, key: &str, value: Complex64);
    fn add_f64(&mut self, key: &str, value: f64);
    fn add_f32(&mut self, key: &str, value: f32);
    fn add_isize(&mut self, key: &str, value: isize);
    fn add_i64(&mut self, key: &str, value: i64);
    fn add_i32(&mut self, key: &str, value: i32);
    fn add_i16(&mut self, key: &str, value: i16);
    fn add_i8(&mut self, key: &str, value: i8);
    fn add_str(&mut self, key: &str, value: &str);
    fn add_usize(&mut self, key: &str, value: usize);
    fn add_u64(&mut self, key: &str, value: u64);
    fn add_u32(&mut self, key: &str, value: u32);
    fn add_u16(&mut self, key: &str, value: u16);
    fn add_u8(&mut self, key: &str, value: u8);
    fn add_byte_string(&mut self, key: &str, value: &[u8]);
    fn add_uintptr(&mut self, key: &str, value: usize);
    fn add_time(&mut self, key: &str, value: DateTime<Utc>);
    fn add_duration(&mut self, key: &str, value: Duration);
    fn add_reflected(&mut self, key: &str, value: &dyn Reflect) -> Result<(), String>;
}

/// A single named piece of structured log data.
#[derive(Debug, Clone)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

/// Builds a field from a key and anything convertible into a [`Value`].
pub fn kv(key: impl Into<String>, value: impl Into<Value>) -> Field {
    Field {
        key: key.into(),
        value: value.into(),
    }
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        kv(key, value)
    }

    /// Writes this field into `enc` using the most specific method for its value.
    ///
    /// If the generic path fails, an extra `"<key>Error"` string field carries
    /// the failure message. Nothing is returned to the caller.
    pub fn add_to(&self, enc: &mut dyn ObjectEncoder) {
        let key = self.key.as_str();
        match &self.value {
            Value::Bool(v) => enc.add_bool(key, *v),
            Value::Complex128(v) => enc.add_complex128(key, *v),
            Value::Complex64(v) => enc.add_complex64(key, *v),
            Value::F64(v) => enc.add_f64(key, *v),
            Value::F32(v) => enc.add_f32(key, *v),
            Value::Isize(v) => enc.add_isize(key, *v),
            Value::I64(v) => enc.add_i64(key, *v),
            Value::I32(v) => enc.add_i32(key, *v),
            Value::I16(v) => enc.add_i16(key, *v),
            Value::I8(v) => enc.add_i8(key, *v),
            Value::Str(v) => enc.add_str(key, v),
            Value::Usize(v) => enc.add_usize(key, *v),
            Value::U64(v) => enc.add_u64(key, *v),
            Value::U32(v) => enc.add_u32(key, *v),
            Value::U16(v) => enc.add_u16(key, *v),
            Value::U8(v) => enc.add_u8(key, *v),
            Value::Bytes(v) => enc.add_byte_string(key, v),
            Value::Uintptr(v) => enc.add_uintptr(key, v.0),
            Value::Time(v) => enc.add_time(key, *v),
            Value::XTime(v) => enc.add_time(key, v.time()),
            Value::Duration(v) => enc.add_duration(key, *v),
            Value::XDuration(v) => enc.add_duration(key, v.as_std()),
            Value::Error(e) => enc.add_str(key, &e.to_string()),
            Value::Display(d) => enc.add_str(key, &d.to_string()),
            Value::Reflected(r) => {
                if let Err(message) = enc.add_reflected(key, r.as_ref()) {
                    enc.add_str(&format!("{}Error", key), &message);
                }
            }
        }
    }
}

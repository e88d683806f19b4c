//! Dynamically typed field values.
//!
//! [`Value`] is a closed set of arms. Plain Rust types convert into their arm
//! through `From`, so `kv("n", 3_i32)` lands in [`Value::I32`] and
//! `kv("ok", true)` in [`Value::Bool`]. Errors, displayable values and
//! serde-serializable values have to be wrapped explicitly with
//! [`Value::error`], [`Value::display`] and [`Value::reflect`].

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::xtime;

/// A complex number with components of type `T`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl<T: fmt::Display + PartialOrd + Default> fmt::Display for Complex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im < T::default() {
            write!(f, "({}{}i)", self.re, self.im)
        } else {
            write!(f, "({}+{}i)", self.re, self.im)
        }
    }
}

/// A complex number with `f64` components.
pub type Complex128 = Complex<f64>;
/// A complex number with `f32` components.
pub type Complex64 = Complex<f32>;

/// An address-sized integer such as a pointer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Uintptr(pub usize);

impl<T> From<*const T> for Uintptr {
    fn from(ptr: *const T) -> Self {
        Self(ptr as usize)
    }
}

/// A value that can be encoded through serde as a last resort.
pub trait Reflect: Send + Sync {
    fn reflect(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<T: serde::Serialize + Send + Sync> Reflect for T {
    fn reflect(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// The value half of a log field.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Complex128(Complex128),
    Complex64(Complex64),
    F64(f64),
    F32(f32),
    Isize(isize),
    I64(i64),
    I32(i32),
    I16(i16),
    I8(i8),
    Str(String),
    Usize(usize),
    U64(u64),
    U32(u32),
    U16(u16),
    U8(u8),
    Bytes(Vec<u8>),
    Uintptr(Uintptr),
    Time(DateTime<Utc>),
    XTime(xtime::Time),
    Duration(std::time::Duration),
    XDuration(xtime::Duration),
    Error(Arc<dyn std::error::Error + Send + Sync>),
    Display(Arc<dyn fmt::Display + Send + Sync>),
    Reflected(Arc<dyn Reflect>),
}

impl Value {
    /// Wraps an error; it is encoded as its message.
    pub fn error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Error(Arc::new(err))
    }

    /// Wraps anything with a textual rendering.
    pub fn display<D>(value: D) -> Self
    where
        D: fmt::Display + Send + Sync + 'static,
    {
        Self::Display(Arc::new(value))
    }

    /// Wraps any serializable value for generic encoding.
    pub fn reflect<R>(value: R) -> Self
    where
        R: serde::Serialize + Send + Sync + 'static,
    {
        Self::Reflected(Arc::new(value))
    }

    /// Name of the dynamic type held by this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Complex128(_) => "complex128",
            Self::Complex64(_) => "complex64",
            Self::F64(_) => "f64",
            Self::F32(_) => "f32",
            Self::Isize(_) => "isize",
            Self::I64(_) => "i64",
            Self::I32(_) => "i32",
            Self::I16(_) => "i16",
            Self::I8(_) => "i8",
            Self::Str(_) => "string",
            Self::Usize(_) => "usize",
            Self::U64(_) => "u64",
            Self::U32(_) => "u32",
            Self::U16(_) => "u16",
            Self::U8(_) => "u8",
            Self::Bytes(_) => "bytes",
            Self::Uintptr(_) => "uintptr",
            Self::Time(_) => "time",
            Self::XTime(_) => "xtime::Time",
            Self::Duration(_) => "duration",
            Self::XDuration(_) => "xtime::Duration",
            Self::Error(_) => "error",
            Self::Display(_) => "display",
            Self::Reflected(_) => "reflected",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "Bool({:?})", v),
            Self::Complex128(v) => write!(f, "Complex128({})", v),
            Self::Complex64(v) => write!(f, "Complex64({})", v),
            Self::F64(v) => write!(f, "F64({:?})", v),
            Self::F32(v) => write!(f, "F32({:?})", v),
            Self::Isize(v) => write!(f, "Isize({})", v),
            Self::I64(v) => write!(f, "I64({})", v),
            Self::I32(v) => write!(f, "I32({})", v),
            Self::I16(v) => write!(f, "I16({})", v),
            Self::I8(v) => write!(f, "I8({})", v),
            Self::Str(v) => write!(f, "Str({:?})", v),
            Self::Usize(v) => write!(f, "Usize({})", v),
            Self::U64(v) => write!(f, "U64({})", v),
            Self::U32(v) => write!(f, "U32({})", v),
            Self::U16(v) => write!(f, "U16({})", v),
            Self::U8(v) => write!(f, "U8({})", v),
            Self::Bytes(v) => write!(f, "Bytes({:?})", v),
            Self::Uintptr(v) => write!(f, "Uintptr({:#x})", v.0),
            Self::Time(v) => write!(f, "Time({})", v),
            Self::XTime(v) => write!(f, "XTime({})", v.0),
            Self::Duration(v) => write!(f, "Duration({:?})", v),
            Self::XDuration(v) => write!(f, "XDuration({})", v),
            Self::Error(e) => write!(f, "Error({:?})", e.to_string()),
            Self::Display(d) => write!(f, "Display({:?})", d.to_string()),
            Self::Reflected(_) => write!(f, "Reflected(..)"),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $arm:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$arm(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    Complex128 => Complex128,
    Complex64 => Complex64,
    f64 => F64,
    f32 => F32,
    isize => Isize,
    i64 => I64,
    i32 => I32,
    i16 => I16,
    i8 => I8,
    String => Str,
    usize => Usize,
    u64 => U64,
    u32 => U32,
    u16 => U16,
    u8 => U8,
    Vec<u8> => Bytes,
    Uintptr => Uintptr,
    DateTime<Utc> => Time,
    xtime::Time => XTime,
    std::time::Duration => Duration,
    xtime::Duration => XDuration,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Value {
    fn from(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Error(Arc::from(e))
    }
}

impl From<std::io::Error> for Value {
    fn from(e: std::io::Error) -> Self {
        Self::error(e)
    }
}

impl From<fmt::Arguments<'_>> for Value {
    fn from(args: fmt::Arguments<'_>) -> Self {
        Self::Str(args.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_picks_width() {
        assert!(matches!(Value::from(1_i8), Value::I8(1)));
        assert!(matches!(Value::from(1_i64), Value::I64(1)));
        assert!(matches!(Value::from(1_usize), Value::Usize(1)));
        assert!(matches!(Value::from(1.5_f32), Value::F32(_)));
        assert!(matches!(Value::from("x"), Value::Str(_)));
        assert!(matches!(Value::from(&b"ab"[..]), Value::Bytes(_)));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::from(7).type_name(), "i32");
        assert_eq!(Value::from("k").type_name(), "string");
        assert_eq!(Value::display(3).type_name(), "display");
    }

    #[test]
    fn test_complex_display() {
        assert_eq!(Complex128::new(1.0, -2.0).to_string(), "(1-2i)");
        assert_eq!(Complex64::new(0.5, 3.0).to_string(), "(0.5+3i)");
    }
}

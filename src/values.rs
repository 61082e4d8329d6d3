use std::fmt;
use std::num::IntErrorKind;

use crate::error::ErrorKind;
use crate::{Error, Result};

/// The four primitive types a flag can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    String,
}

impl ValueType {
    /// The type name shown in flag detail lines of the usage text.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
        }
    }

    /// Placeholder shown after required flags in the usage header when no
    /// short description is set.
    pub fn default_short_description(self) -> &'static str {
        match self {
            Self::Bool => "somebool",
            Self::Int => "someint",
            Self::Float => "somefloat",
            Self::String => "somestring",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Caller-owned storage a parsed flag value is written into.
///
/// Only the four supported primitives convert into a `Slot`, so binding a
/// flag to any other type is rejected by the compiler.
#[derive(Debug)]
pub enum Slot<'a> {
    Bool(&'a mut bool),
    Int(&'a mut i64),
    Float(&'a mut f64),
    String(&'a mut String),
}

impl<'a> From<&'a mut bool> for Slot<'a> {
    fn from(place: &'a mut bool) -> Self {
        Self::Bool(place)
    }
}

impl<'a> From<&'a mut i64> for Slot<'a> {
    fn from(place: &'a mut i64) -> Self {
        Self::Int(place)
    }
}

impl<'a> From<&'a mut f64> for Slot<'a> {
    fn from(place: &'a mut f64) -> Self {
        Self::Float(place)
    }
}

impl<'a> From<&'a mut String> for Slot<'a> {
    fn from(place: &'a mut String) -> Self {
        Self::String(place)
    }
}

impl Slot<'_> {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
        }
    }

    pub fn get(&self) -> ValueRef<'_> {
        match self {
            Self::Bool(v) => ValueRef::Bool(**v),
            Self::Int(v) => ValueRef::Int(**v),
            Self::Float(v) => ValueRef::Float(**v),
            Self::String(v) => ValueRef::String(v.as_str()),
        }
    }

    /// Overwrite the slot. The caller guarantees `value` has the slot's type.
    pub(crate) fn set(&mut self, value: &Value) {
        match (self, value) {
            (Self::Bool(p), Value::Bool(v)) => **p = *v,
            (Self::Int(p), Value::Int(v)) => **p = *v,
            (Self::Float(p), Value::Float(v)) => **p = *v,
            (Self::String(p), Value::String(v)) => v.clone_into(p),
            (slot, value) => debug_assert_eq!(slot.value_type(), value.value_type()),
        }
    }
}

/// An owned typed value, used for default values and read-back.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn zero(ty: ValueType) -> Self {
        match ty {
            ValueType::Bool => Self::Bool(false),
            ValueType::Int => Self::Int(0),
            ValueType::Float => Self::Float(0.0),
            ValueType::String => Self::String(String::new()),
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.as_ref().value_type()
    }

    pub fn as_ref(&self) -> ValueRef<'_> {
        match self {
            Self::Bool(v) => ValueRef::Bool(*v),
            Self::Int(v) => ValueRef::Int(*v),
            Self::Float(v) => ValueRef::Float(*v),
            Self::String(v) => ValueRef::String(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// A borrowed view of a bound value, as seen by validators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(&'a str),
}

impl ValueRef<'_> {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
        }
    }

    /// Whether this is the zero value of its type. Booleans are never zero.
    pub fn is_zero(&self) -> bool {
        match *self {
            Self::Bool(_) => false,
            Self::Int(v) => v == 0,
            Self::Float(v) => v == 0.0,
            Self::String(v) => v.is_empty(),
        }
    }

    pub fn to_value(&self) -> Value {
        match *self {
            Self::Bool(v) => Value::Bool(v),
            Self::Int(v) => Value::Int(v),
            Self::Float(v) => Value::Float(v),
            Self::String(v) => Value::String(v.to_owned()),
        }
    }
}

impl fmt::Display for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => v.fmt(f),
            Self::Int(v) => v.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::String(v) => v.fmt(f),
        }
    }
}

/// A primitive a flag value can be converted into from its textual form.
pub(crate) trait FlagValue: Sized + 'static {
    const TYPE: ValueType;

    /// The value of a flag given without `=value`, if the type allows that.
    fn bare() -> Option<Self> {
        None
    }

    /// Failures carry the input and the conversion error as source; the
    /// caller attaches the flag name.
    fn parse_flag(s: &str) -> Result<Self>;
}

#[cold]
fn invalid_value(s: &str, cause: &'static str) -> Error {
    ErrorKind::InvalidValue.with_input(s.into()).with_source(cause.into())
}

impl FlagValue for bool {
    const TYPE: ValueType = ValueType::Bool;

    fn bare() -> Option<Self> {
        Some(true)
    }

    fn parse_flag(s: &str) -> Result<Self> {
        parse_bool(s).ok_or_else(|| invalid_value(s, "parse error"))
    }
}

impl FlagValue for i64 {
    const TYPE: ValueType = ValueType::Int;

    fn parse_flag(s: &str) -> Result<Self> {
        parse_int(s).map_err(|err| match err {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                invalid_value(s, "value out of range")
            }
            _ => invalid_value(s, "parse error"),
        })
    }
}

impl FlagValue for f64 {
    const TYPE: ValueType = ValueType::Float;

    fn parse_flag(s: &str) -> Result<Self> {
        s.parse().map_err(|_| invalid_value(s, "parse error"))
    }
}

impl FlagValue for String {
    const TYPE: ValueType = ValueType::String;

    fn parse_flag(s: &str) -> Result<Self> {
        Ok(s.to_owned())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Signed integer with an optional `0x`, `0o` or `0b` radix prefix. A bare
/// leading zero stays decimal.
fn parse_int(s: &str) -> Result<i64, IntErrorKind> {
    let (neg, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        Some("0o" | "0O") => (8, &unsigned[2..]),
        Some("0b" | "0B") => (2, &unsigned[2..]),
        _ => (10, unsigned),
    };
    // `from_str_radix` accepts its own sign, which must not follow a prefix.
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(IntErrorKind::InvalidDigit);
    }
    // Parse with the sign applied so `i64::MIN` round-trips.
    let signed;
    let digits = if neg {
        signed = format!("-{digits}");
        signed.as_str()
    } else {
        digits
    };
    i64::from_str_radix(digits, radix).map_err(|err| err.kind().clone())
}

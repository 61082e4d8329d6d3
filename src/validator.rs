//! Post-parse value rules.
use std::fmt;

use crate::values::ValueRef;

/// A rule deciding whether a bound value is acceptable.
///
/// `Err` carries the reason, which is reported as `"<reason>: -<flag>"`.
///
/// Closures `Fn(ValueRef<'_>) -> Result<(), String>` implement this trait, so
/// ad-hoc rules compose with the built-in ones:
///
/// ```
/// use flagbind::{ArgOptions, ValueRef};
///
/// let port = ArgOptions::new().required().validator(|v: ValueRef<'_>| match v {
///     ValueRef::Int(1..=65535) => Ok(()),
///     _ => Err("port out of range".to_owned()),
/// });
/// # let _ = port;
/// ```
pub trait Validator {
    fn validate(&self, value: ValueRef<'_>) -> Result<(), String>;
}

impl<F> Validator for F
where
    F: Fn(ValueRef<'_>) -> Result<(), String>,
{
    fn validate(&self, value: ValueRef<'_>) -> Result<(), String> {
        self(value)
    }
}

/// Accepts everything. The validator of optional flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysPass;

impl Validator for AlwaysPass {
    fn validate(&self, _: ValueRef<'_>) -> Result<(), String> {
        Ok(())
    }
}

/// Rejects the zero value of numbers and strings. Booleans always pass.
///
/// A flag that is omitted and a flag explicitly set to `0`, `0.0` or `""`
/// are indistinguishable here: both are rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct Required;

impl Required {
    pub const REASON: &str = "val is required";
}

impl Validator for Required {
    fn validate(&self, value: ValueRef<'_>) -> Result<(), String> {
        if value.is_zero() { Err(Self::REASON.to_owned()) } else { Ok(()) }
    }
}

/// Run `validators` in order, stopping at the first rejection.
pub(crate) fn validate_all(
    validators: &[Box<dyn Validator>],
    value: ValueRef<'_>,
) -> Result<(), String> {
    validators.iter().try_for_each(|v| v.validate(value))
}

impl fmt::Debug for dyn Validator + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<validator>")
    }
}

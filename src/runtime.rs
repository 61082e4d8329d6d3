//! Token recognition: turning raw arguments into writes on flag slots.
//!
//! The parser only talks to a [`Tokenizer`] through [`FlagLookup`] and
//! [`ArgPlace`], so a different flag syntax can be plugged in via
//! [`ArgParser::with_tokenizer`](crate::ArgParser::with_tokenizer).
use std::ffi::{OsStr, OsString};

use os_str_bytes::OsStrBytesExt;
use ref_cast::RefCast;
use tracing::trace;

use crate::Result;
use crate::error::ErrorKind;
use crate::values::{FlagValue, Slot, ValueType};

/// A named flag with its slot attached as `&mut self`.
pub trait ArgPlace {
    /// The type of the slot behind this place.
    fn value_type(&self) -> ValueType;

    /// Whether the flag consumes a value. If not, it may still accept an
    /// inlined `-flag=value`.
    fn takes_value(&self) -> bool;

    /// Convert and store `value`. `None` means the flag appeared bare.
    fn feed(&mut self, value: Option<&str>) -> Result<()>;
}

/// Resolves flag names to their places.
pub trait FlagLookup {
    fn place(&mut self, name: &str) -> Option<&mut dyn ArgPlace>;
}

/// Splits raw arguments into flag assignments and leftover positionals.
pub trait Tokenizer {
    /// Feed every recognized flag into its place and return the unconsumed
    /// tail. Writes before a failing token are not rolled back.
    fn tokenize(
        &mut self,
        args: &mut dyn Iterator<Item = OsString>,
        flags: &mut dyn FlagLookup,
    ) -> Result<Vec<String>>;
}

#[derive(RefCast)]
#[repr(transparent)]
struct Place<T>(T);

impl<T: FlagValue> ArgPlace for Place<T> {
    fn value_type(&self) -> ValueType {
        T::TYPE
    }

    fn takes_value(&self) -> bool {
        T::bare().is_none()
    }

    fn feed(&mut self, value: Option<&str>) -> Result<()> {
        self.0 = match value {
            Some(v) => T::parse_flag(v)?,
            None => T::bare().ok_or(ErrorKind::MissingValue)?,
        };
        Ok(())
    }
}

#[inline(always)]
pub(crate) fn place_for_slot<'s>(slot: &'s mut Slot<'_>) -> &'s mut dyn ArgPlace {
    match slot {
        Slot::Bool(p) => Place::<bool>::ref_cast_mut(p),
        Slot::Int(p) => Place::<i64>::ref_cast_mut(p),
        Slot::Float(p) => Place::<f64>::ref_cast_mut(p),
        Slot::String(p) => Place::<String>::ref_cast_mut(p),
    }
}

/// The default tokenizer, with single-dash long flags.
///
/// - `-name` and `--name` are equivalent.
/// - Value flags take `-name=value` or `-name value`; the next argument is
///   taken even if it starts with `-`.
/// - Boolean flags never consume the next argument. `-name=false` is the
///   only way to pass an explicit value.
/// - Scanning stops at the first non-flag argument (including a lone `-`),
///   or after a `--` which is itself consumed. Everything after is leftover.
///
/// Integers are decimal unless prefixed with `0x`, `0o` or `0b`. Unlike the
/// classic flag package, a leading `0` does not mean octal (`010` is ten) and
/// `_` digit separators are rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlagTokenizer;

impl Tokenizer for FlagTokenizer {
    fn tokenize(
        &mut self,
        args: &mut dyn Iterator<Item = OsString>,
        flags: &mut dyn FlagLookup,
    ) -> Result<Vec<String>> {
        while let Some(arg) = args.next() {
            let body = if arg.len() < 2 || !arg.starts_with('-') {
                return collect_rest(Some(arg), args);
            } else if let Some(rest) = arg.strip_prefix("--") {
                if rest.is_empty() {
                    return collect_rest(None, args);
                }
                rest
            } else {
                arg.index(1..)
            };
            if body.starts_with('-') || body.starts_with('=') {
                return Err(ErrorKind::BadFlagSyntax.with_input(arg));
            }

            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            let name = utf8(name)?;
            let place = flags.place(name).ok_or_else(|| ErrorKind::UnknownFlag.with_name(name))?;

            let next;
            let value = match inline {
                Some(v) => Some(utf8(v)?),
                None if place.takes_value() => {
                    next = args.next().ok_or_else(|| ErrorKind::MissingValue.with_name(name))?;
                    Some(utf8(&next)?)
                }
                None => None,
            };
            trace!(flag = name, ty = place.value_type().name(), value, "bind flag");
            place.feed(value).map_err(|err| err.or_name(name))?;
        }
        Ok(Vec::new())
    }
}

fn utf8(s: &OsStr) -> Result<&str> {
    s.to_str().ok_or_else(|| ErrorKind::InvalidUtf8.with_input(s.into()))
}

fn collect_rest(
    first: Option<OsString>,
    rest: &mut dyn Iterator<Item = OsString>,
) -> Result<Vec<String>> {
    first
        .into_iter()
        .chain(rest)
        .map(|arg| arg.into_string().map_err(|arg| ErrorKind::InvalidUtf8.with_input(arg)))
        .collect()
}

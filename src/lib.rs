//! *Typed command line flags bound to caller-owned slots, with post-parse validation.*
//!
//! Flags are declared against `bool`, `i64`, `f64` or `String` variables
//! together with an [`ArgOptions`] describing the default value, help text and
//! [`Validator`]s. [`ArgParser::parse`] then runs three steps in order:
//! tokenizing (writing values into the slots), validation of every flag in
//! declaration order, and a count check of required positional arguments.
//! The first failure of any step is returned.
//!
//! ```
//! use flagbind::{ArgOptions, ArgParser};
//!
//! let mut name = String::new();
//! let mut retries = 0i64;
//! let mut help = false;
//!
//! let mut parser = ArgParser::new("fetch");
//! parser
//!     .help_flag(&mut help)
//!     .flag(&mut name, "name", ArgOptions::new().required().usage("Resource name"))
//!     .flag(&mut retries, "retries", ArgOptions::new().default_val(3))
//!     .positional("dest", "Destination directory", true);
//!
//! match parser.parse(["-name", "index", "out/"]) {
//!     Ok(rest) => assert_eq!(rest, ["out/"]),
//!     Err(err) => panic!("{}", parser.render_usage(Some(&err))),
//! }
//! drop(parser);
//! assert_eq!(name, "index");
//! assert_eq!(retries, 3);
//! assert!(!help);
//! ```
//!
//! # Zero values and `required`
//!
//! There is no tracking of whether a flag was supplied. [`Required`] rejects
//! the zero value of numbers and strings, so `-n 0` fails a required `-n`
//! exactly like an omitted one, and a required boolean always passes.
#![forbid(unsafe_code)]

mod error;
mod options;
mod parser;
mod runtime;
mod validator;
mod values;

#[cfg(feature = "help")]
mod help;

pub use crate::error::{Error, ErrorKind, Stage};
pub use crate::options::{ArgOptions, OptionSnapshot};
pub use crate::parser::{ArgParser, FlagEntry, PositionalEntry};
pub use crate::runtime::{ArgPlace, FlagLookup, FlagTokenizer, Tokenizer};
pub use crate::validator::{AlwaysPass, Required, Validator};
pub use crate::values::{Slot, Value, ValueRef, ValueType};

pub type Result<T, E = Error> = std::result::Result<T, E>;

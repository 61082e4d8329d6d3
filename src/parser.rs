use std::ffi::OsString;
use std::path::Path;

use tracing::debug;

use crate::error::ErrorKind;
use crate::options::{ArgOptions, OptionSnapshot};
use crate::runtime::{ArgPlace, FlagLookup, FlagTokenizer, Tokenizer, place_for_slot};
use crate::validator::validate_all;
use crate::values::{Slot, Value, ValueType};
use crate::{Error, Result};

/// A declared flag: its name, the caller's slot and the frozen options.
#[derive(Debug)]
pub struct FlagEntry<'a> {
    name: String,
    slot: Slot<'a>,
    opts: OptionSnapshot,
}

impl FlagEntry<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.slot.value_type()
    }

    pub fn options(&self) -> &OptionSnapshot {
        &self.opts
    }

    /// The current content of the slot.
    pub fn value(&self) -> Value {
        self.slot.get().to_value()
    }

    fn reset(&mut self) {
        match self.opts.default_val() {
            Some(v) => self.slot.set(v),
            None => self.slot.set(&Value::zero(self.slot.value_type())),
        }
    }
}

/// A declared positional argument. Only counted and documented, never bound.
#[derive(Debug, Clone)]
pub struct PositionalEntry {
    name: String,
    usage: String,
    required: bool,
}

impl PositionalEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

struct Flags<'r, 'a>(&'r mut [FlagEntry<'a>]);

impl FlagLookup for Flags<'_, '_> {
    fn place(&mut self, name: &str) -> Option<&mut dyn ArgPlace> {
        let entry = self.0.iter_mut().find(|e| e.name == name)?;
        Some(place_for_slot(&mut entry.slot))
    }
}

/// Flag and positional declarations bound to caller-owned slots.
///
/// Declare everything first, then [`parse`](Self::parse). Declaration
/// methods chain and never fail on their own: a misconfiguration is recorded
/// and the first one is returned by every later `parse` call.
/// [`try_flag`](Self::try_flag) reports immediately instead.
///
/// ```
/// use flagbind::{ArgOptions, ArgParser};
///
/// let (mut verbose, mut level) = (false, 0i64);
/// let mut p = ArgParser::new("demo");
/// p.flag(&mut verbose, "v", ArgOptions::new().usage("Verbose output"))
///     .flag(&mut level, "level", ArgOptions::new().required())
///     .positional("file", "Input file", true);
///
/// assert_eq!(p.parse(["-v", "-level", "3", "a.txt"]).unwrap(), ["a.txt"]);
/// assert_eq!(p.parse(["a.txt"]).unwrap_err().to_string(), "val is required: -level");
/// drop(p);
/// assert!(!verbose);
/// assert_eq!(level, 0);
/// ```
pub struct ArgParser<'a> {
    program: String,
    flags: Vec<FlagEntry<'a>>,
    positionals: Vec<PositionalEntry>,
    /// Deferred registration errors, in declaration order.
    errors: Vec<Error>,
    args: Vec<String>,
    parsed: bool,
    tokenizer: Box<dyn Tokenizer + 'a>,
    #[cfg(feature = "help")]
    pub(crate) output: Box<dyn std::io::Write + 'a>,
}

impl std::fmt::Debug for ArgParser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgParser")
            .field("program", &self.program)
            .field("flags", &self.flags)
            .field("positionals", &self.positionals)
            .field("errors", &self.errors)
            .field("args", &self.args)
            .field("parsed", &self.parsed)
            .finish_non_exhaustive()
    }
}

impl<'a> ArgParser<'a> {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flags: Vec::new(),
            positionals: Vec::new(),
            errors: Vec::new(),
            args: Vec::new(),
            parsed: false,
            tokenizer: Box::new(FlagTokenizer),
            #[cfg(feature = "help")]
            output: Box::new(std::io::sink()),
        }
    }

    /// Named after the file name of the process's `argv[0]`.
    pub fn from_env() -> Self {
        let arg0 = std::env::args_os().next().unwrap_or_default();
        let program = Path::new(&arg0).file_name().unwrap_or(arg0.as_ref());
        Self::new(program.to_string_lossy())
    }

    /// Replace the default [`FlagTokenizer`].
    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'a) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    pub fn program_name(&self) -> &str {
        &self.program
    }

    /// Declare a flag bound to `slot`, which supports `bool`, `i64`, `f64`
    /// and `String`.
    ///
    /// The slot is immediately set to the default value, or the zero value
    /// of its type if there is none. Errors are deferred to [`parse`](Self::parse).
    pub fn flag(&mut self, slot: impl Into<Slot<'a>>, name: &str, opts: ArgOptions) -> &mut Self {
        if let Err(err) = self.declare_flag(slot.into(), name, opts) {
            debug!(flag = name, error = %err, "deferring registration error");
            self.errors.push(err);
        }
        self
    }

    /// Like [`flag`](Self::flag), but returns the registration error
    /// directly. A failed declaration is not recorded.
    pub fn try_flag(
        &mut self,
        slot: impl Into<Slot<'a>>,
        name: &str,
        opts: ArgOptions,
    ) -> Result<&mut Self> {
        self.declare_flag(slot.into(), name, opts)?;
        Ok(self)
    }

    /// Declare the boolean help flag `-h`.
    pub fn help_flag(&mut self, slot: &'a mut bool) -> &mut Self {
        self.flag(slot, "h", ArgOptions::new().usage("Help"))
    }

    /// Declare a positional argument.
    ///
    /// Positionals are only used for usage text and for counting: parsing
    /// fails if fewer leftovers remain than positionals are required.
    pub fn positional(&mut self, name: &str, usage: &str, required: bool) -> &mut Self {
        let ret = if self.parsed {
            Err(ErrorKind::DeclaredAfterParse.with_name(name))
        } else if self.positionals.iter().any(|p| p.name == name) {
            Err(ErrorKind::DuplicatePositional.with_name(name))
        } else {
            Ok(())
        };
        match ret {
            Ok(()) => self.positionals.push(PositionalEntry {
                name: name.to_owned(),
                usage: usage.to_owned(),
                required,
            }),
            Err(err) => {
                debug!(positional = name, error = %err, "deferring registration error");
                self.errors.push(err);
            }
        }
        self
    }

    fn declare_flag(&mut self, mut slot: Slot<'a>, name: &str, opts: ArgOptions) -> Result<()> {
        if self.parsed {
            return Err(ErrorKind::DeclaredAfterParse.with_name(name));
        }
        if name.is_empty() || name.starts_with('-') || name.contains('=') {
            return Err(ErrorKind::InvalidFlagName.with_name(name));
        }
        if self.flags.iter().any(|e| e.name == name) {
            return Err(ErrorKind::DuplicateFlag.with_name(name));
        }
        let ty = slot.value_type();
        let opts = opts.finish(ty);
        if opts.default_val().is_some_and(|v| v.value_type() != ty) {
            return Err(ErrorKind::TypeMismatch.with_name(name));
        }
        slot.set(opts.default_val().unwrap_or(&Value::zero(ty)));
        self.flags.push(FlagEntry { name: name.to_owned(), slot, opts });
        Ok(())
    }

    /// Parse the process arguments, excluding `argv[0]`.
    pub fn parse_env(&mut self) -> Result<&[String]> {
        self.parse(std::env::args_os().skip(1))
    }

    /// Parse `args` (without the program name) into the declared slots.
    ///
    /// Each call starts over: slots are reset to their defaults first, so
    /// nothing from a previous call survives. On success the leftover
    /// positional arguments are returned.
    ///
    /// Failures, in priority order:
    /// 1. The first deferred registration error.
    /// 2. A tokenizing error. Slots written before the failing token keep
    ///    their values and should not be trusted.
    /// 3. The first validator rejection, in declaration order.
    /// 4. Fewer leftovers than required positionals.
    pub fn parse<I, T>(&mut self, args: I) -> Result<&[String]>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.parsed = true;
        self.args.clear();

        if let Some(err) = self.errors.first() {
            return Err(err.clone());
        }

        debug!(program = %self.program, flags = self.flags.len(), "parsing arguments");
        for entry in &mut self.flags {
            entry.reset();
        }

        let mut iter = args.into_iter().map(Into::<OsString>::into);
        self.args = self.tokenizer.tokenize(&mut iter, &mut Flags(&mut self.flags))?;

        self.validate()?;

        let required = self.positionals.iter().filter(|p| p.required).count();
        if self.args.len() < required {
            return Err(ErrorKind::InsufficientPositional.into());
        }

        debug!(leftovers = self.args.len(), "parsed arguments");
        Ok(&self.args)
    }

    fn validate(&self) -> Result<()> {
        for entry in &self.flags {
            validate_all(entry.opts.validators(), entry.slot.get())
                .map_err(|reason| Error::validation(&entry.name, reason))?;
        }
        Ok(())
    }

    /// Leftover arguments of the last parse.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Read back the current value of a declared flag.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.flags.iter().find(|e| e.name == name).map(FlagEntry::value)
    }

    /// Declared flags, in declaration order.
    pub fn flags(&self) -> &[FlagEntry<'a>] {
        &self.flags
    }

    /// Declared positionals, in declaration order.
    pub fn positionals(&self) -> &[PositionalEntry] {
        &self.positionals
    }
}

use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

pub(crate) type DynStdError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type of declaration and parsing.
///
/// Errors are boxed so `Result<T, Error>` stays pointer-sized on the happy path.
#[derive(Clone)]
pub struct Error(Box<Inner>);

#[derive(Clone)]
struct Inner {
    kind: ErrorKind,
    /// The flag or positional name this error is about, without the leading `-`.
    name: Option<String>,
    /// The raw input that caused the error.
    input: Option<OsString>,
    /// Reason reported by a validator.
    reason: Option<String>,
    source: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
}

/// Which step of declaration or parsing produced an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Misconfigured declaration. Recorded at declaration time, reported by the next parse.
    Registration,
    /// The raw arguments could not be bound to flags.
    Tokenize,
    /// A validator rejected a bound value.
    Validation,
    /// Fewer leftover arguments than required positionals.
    Positional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    // Registration.
    TypeMismatch,
    DuplicateFlag,
    DuplicatePositional,
    InvalidFlagName,
    DeclaredAfterParse,

    // Tokenize.
    UnknownFlag,
    MissingValue,
    InvalidValue,
    BadFlagSyntax,
    InvalidUtf8,

    // Validation.
    Validation,

    // Positional.
    InsufficientPositional,
}

impl ErrorKind {
    pub fn stage(self) -> Stage {
        match self {
            Self::TypeMismatch
            | Self::DuplicateFlag
            | Self::DuplicatePositional
            | Self::InvalidFlagName
            | Self::DeclaredAfterParse => Stage::Registration,
            Self::UnknownFlag
            | Self::MissingValue
            | Self::InvalidValue
            | Self::BadFlagSyntax
            | Self::InvalidUtf8 => Stage::Tokenize,
            Self::Validation => Stage::Validation,
            Self::InsufficientPositional => Stage::Positional,
        }
    }

    #[cold]
    pub(crate) fn with_name(self, name: impl Into<String>) -> Error {
        Error::from(self).with_name(name)
    }

    #[cold]
    pub(crate) fn with_input(self, input: OsString) -> Error {
        Error::from(self).with_input(input)
    }
}

impl From<ErrorKind> for Error {
    #[cold]
    fn from(kind: ErrorKind) -> Self {
        Self(Box::new(Inner { kind, name: None, input: None, reason: None, source: None }))
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        self.0.kind
    }

    pub fn stage(&self) -> Stage {
        self.0.kind.stage()
    }

    /// The flag or positional name this error refers to, if any.
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// The reason reported by the failing validator.
    pub fn reason(&self) -> Option<&str> {
        self.0.reason.as_deref()
    }

    pub(crate) fn validation(name: &str, reason: String) -> Self {
        let mut err = ErrorKind::Validation.with_name(name);
        err.0.reason = Some(reason);
        err
    }

    pub(crate) fn with_name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    pub(crate) fn with_input(mut self, input: OsString) -> Self {
        self.0.input = Some(input);
        self
    }

    pub(crate) fn with_source(mut self, source: DynStdError) -> Self {
        self.0.source = Some(source.into());
        self
    }

    /// Attach the flag name if the error does not carry one yet.
    pub(crate) fn or_name(self, name: &str) -> Self {
        if self.0.name.is_some() { self } else { self.with_name(name) }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("input", &self.0.input)
            .field("reason", &self.0.reason)
            .field("source", &self.0.source)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.0.name.as_deref().unwrap_or("");
        let input = self.0.input.as_deref().map(|s| s.to_string_lossy());
        match self.0.kind {
            ErrorKind::TypeMismatch => {
                write!(f, "Type mismatch between slot and default value: {name}")
            }
            ErrorKind::DuplicateFlag => write!(f, "flag redefined: {name}"),
            ErrorKind::DuplicatePositional => write!(f, "non-flag argument redefined: {name}"),
            ErrorKind::InvalidFlagName => write!(f, "invalid flag name: {name:?}"),
            ErrorKind::DeclaredAfterParse => write!(f, "argument declared after parsing: {name}"),
            ErrorKind::UnknownFlag => write!(f, "flag provided but not defined: -{name}"),
            ErrorKind::MissingValue => write!(f, "flag needs an argument: -{name}"),
            ErrorKind::InvalidValue => {
                write!(f, "invalid value {:?} for flag -{name}", input.unwrap_or_default())?;
                if let Some(src) = &self.0.source {
                    write!(f, ": {src}")?;
                }
                Ok(())
            }
            ErrorKind::BadFlagSyntax => {
                write!(f, "bad flag syntax: {}", input.unwrap_or_default())
            }
            ErrorKind::InvalidUtf8 => {
                write!(f, "invalid UTF-8 in argument: {:?}", input.unwrap_or_default())
            }
            ErrorKind::Validation => {
                write!(f, "{}: -{name}", self.0.reason.as_deref().unwrap_or("invalid value"))
            }
            ErrorKind::InsufficientPositional => {
                f.write_str("Insufficient number of non-flag arguments")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source.as_deref().map(|err| err as _)
    }
}

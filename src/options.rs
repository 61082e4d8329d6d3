use crate::validator::{AlwaysPass, Required, Validator};
use crate::values::{Value, ValueType};

/// Per-flag configuration, accumulated before the flag is declared.
///
/// Each method is one independent mutation and they apply in call order, so
/// a later `short_description` overrides an earlier one while validators
/// accumulate.
///
/// ```
/// use flagbind::ArgOptions;
///
/// let opts = ArgOptions::new()
///     .default_val(8080)
///     .short_description("port")
///     .usage("Port to listen on");
/// # let _ = opts;
/// ```
#[derive(Default)]
#[must_use]
pub struct ArgOptions {
    default_val: Option<Value>,
    short_description: Option<String>,
    usage: String,
    required: bool,
    validators: Vec<Box<dyn Validator>>,
}

impl ArgOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value the slot holds when the flag is absent.
    ///
    /// Its type must match the slot, or the declaration records a
    /// type-mismatch error that the next parse reports.
    pub fn default_val(mut self, value: impl Into<Value>) -> Self {
        self.default_val = Some(value.into());
        self
    }

    /// Placeholder shown after a required flag in the usage header,
    /// e.g. `-c <short description>`. Defaults to a name derived from the slot type.
    pub fn short_description(mut self, desc: impl Into<String>) -> Self {
        self.short_description = Some(desc.into());
        self
    }

    /// Detailed description shown in the flag's detail line.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Mark the flag required, which also appends the [`Required`] validator.
    pub fn required(mut self) -> Self {
        self.required = true;
        self.validator(Required)
    }

    /// Append a validator. All validators must pass, checked in order.
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Freeze into the snapshot stored by the registry for a slot of type `ty`.
    pub(crate) fn finish(self, ty: ValueType) -> OptionSnapshot {
        let mut validators = self.validators;
        if validators.is_empty() {
            validators.push(Box::new(AlwaysPass));
        }
        OptionSnapshot {
            default_val: self.default_val,
            short_description: self
                .short_description
                .unwrap_or_else(|| ty.default_short_description().to_owned()),
            usage: self.usage,
            required: self.required,
            validators,
        }
    }
}

impl std::fmt::Debug for ArgOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgOptions")
            .field("default_val", &self.default_val)
            .field("short_description", &self.short_description)
            .field("usage", &self.usage)
            .field("required", &self.required)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// The frozen configuration of a declared flag.
#[derive(Debug)]
pub struct OptionSnapshot {
    default_val: Option<Value>,
    short_description: String,
    usage: String,
    required: bool,
    validators: Vec<Box<dyn Validator>>,
}

impl OptionSnapshot {
    pub fn default_val(&self) -> Option<&Value> {
        self.default_val.as_ref()
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn validators(&self) -> &[Box<dyn Validator>] {
        &self.validators
    }
}

use std::io::{self, Write};

use crate::Error;
use crate::parser::{ArgParser, FlagEntry};
use crate::values::{ValueRef, ValueType};

#[inline(never)]
fn push_str(out: &mut String, s: &str) {
    out.push_str(s);
}

/// Points the parser's output at another writer until dropped.
struct Redirect<'p, 'a> {
    output: &'p mut Box<dyn Write + 'a>,
    saved: Option<Box<dyn Write + 'a>>,
}

impl<'p, 'a> Redirect<'p, 'a> {
    fn new(output: &'p mut Box<dyn Write + 'a>, dest: Box<dyn Write + 'a>) -> Self {
        let saved = std::mem::replace(output, dest);
        Self { output, saved: Some(saved) }
    }

    fn writer(&mut self) -> &mut dyn Write {
        &mut **self.output
    }
}

impl Drop for Redirect<'_, '_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self.output = saved;
        }
    }
}

impl<'a> ArgParser<'a> {
    /// Render the usage text, preceded by `err` on its own line if any.
    ///
    /// This only reads declarations and may be called at any time.
    pub fn render_usage(&self, err: Option<&Error>) -> String {
        let mut out = String::new();
        render_usage_into(&mut out, self, err);
        out
    }

    /// Write the usage text to the configured output, which discards
    /// everything unless set by [`set_output`](Self::set_output).
    pub fn write_usage(&mut self, err: Option<&Error>) -> io::Result<()> {
        let text = self.render_usage(err);
        self.output.write_all(text.as_bytes())?;
        self.output.flush()
    }

    /// Write the usage text to stderr.
    ///
    /// The output is redirected only for this call and restored afterwards,
    /// even if writing fails.
    pub fn print_usage(&mut self, err: Option<&Error>) -> io::Result<()> {
        let text = self.render_usage(err);
        let mut redirect = Redirect::new(&mut self.output, Box::new(io::stderr()));
        let w = redirect.writer();
        w.write_all(text.as_bytes())?;
        w.flush()
    }

    pub fn set_output(&mut self, output: impl Write + 'a) {
        self.output = Box::new(output);
    }
}

#[cold]
pub(crate) fn render_usage_into(out: &mut String, p: &ArgParser<'_>, err: Option<&Error>) {
    macro_rules! w {
        ($($e:expr),*) => {{
            $(push_str(out, $e);)*
        }};
    }

    if let Some(err) = err {
        w!(&err.to_string(), "\n");
    }

    // Header.

    w!("Usage: ", p.program_name());
    let mut has_optional = false;
    for flag in p.flags() {
        let opts = flag.options();
        if opts.is_required() {
            w!(" -", flag.name());
            if flag.value_type() != ValueType::Bool {
                w!(" <", opts.short_description(), ">");
            }
        } else {
            has_optional = true;
        }
    }
    if has_optional {
        w!(" [...]");
    }
    for arg in p.positionals().iter().filter(|arg| arg.is_required()) {
        w!(" ", arg.name());
    }
    w!("\n");

    // Flag details.

    for flag in p.flags() {
        render_flag(out, flag);
    }

    // Positional details.

    for arg in p.positionals() {
        w!("  ", arg.name(), "\t");
        if arg.is_required() {
            w!("(Required) ");
        }
        w!(arg.usage(), "\n");
    }
}

/// `  -name type` then the usage, on the same line after a tab for one-letter
/// boolean flags, otherwise on the next line.
fn render_flag(out: &mut String, flag: &FlagEntry<'_>) {
    let start = out.len();
    push_str(out, "  -");
    push_str(out, flag.name());
    if flag.value_type() != ValueType::Bool {
        push_str(out, " ");
        push_str(out, flag.value_type().name());
    }
    let sep = if out.len() - start <= 4 { "\t" } else { "\n    \t" };
    push_str(out, sep);

    let opts = flag.options();
    if opts.is_required() {
        push_str(out, "(Required) ");
    }
    for (i, line) in opts.usage().split('\n').enumerate() {
        if i != 0 {
            push_str(out, "\n    \t");
        }
        push_str(out, line);
    }

    if let Some(default) = opts.default_val().map(|v| v.as_ref()).filter(|v| !is_zero(v)) {
        let s = match default {
            ValueRef::String(s) => format!(" (default {s:?})"),
            ValueRef::Float(v) => format!(" (default {})", fmt_float(v)),
            v => format!(" (default {v})"),
        };
        push_str(out, &s);
    }
    push_str(out, "\n");
}

/// Shortest `%g` form: exponent notation when the decimal exponent is below
/// -4 or at least 6, with a signed exponent of two or more digits.
fn fmt_float(v: f64) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_owned();
    }
    let sci = format!("{v:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };
    if (-4..6).contains(&exp) {
        v.to_string()
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
    }
}

// Unlike `ValueRef::is_zero`, `false` is the zero boolean here.
fn is_zero(v: &ValueRef<'_>) -> bool {
    matches!(v, ValueRef::Bool(false)) || v.is_zero()
}

//! Command lines with maskable arguments.
//!
//! A [`CommandLine`] carries every argument in full for execution, but renders
//! masked arguments as [`MASK_PLACEHOLDER`] in both `Display` and `Debug`
//! output so secrets never reach a diagnostic surface.

use std::fmt;

/// Text shown in place of a masked argument.
pub const MASK_PLACEHOLDER: &str = "********";

/// A single command-line argument.
#[derive(Clone, PartialEq, Eq)]
pub struct Arg {
    value: String,
    masked: bool,
}

impl Arg {
    /// Create a plain argument.
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            masked: false,
        }
    }

    /// Create an argument whose value must never be rendered.
    #[must_use]
    pub fn masked(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            masked: true,
        }
    }

    /// Return whether the argument is masked.
    #[must_use]
    pub const fn is_masked(&self) -> bool {
        self.masked
    }

    /// Return the real value, for execution only.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.masked {
            return f.write_str(MASK_PLACEHOLDER);
        }
        let needs_quotes = self.value.is_empty()
            || self
                .value
                .contains(|c: char| c.is_whitespace() || c == '"');
        if !needs_quotes {
            return f.write_str(&self.value);
        }
        f.write_str("\"")?;
        for c in self.value.chars() {
            if matches!(c, '"' | '\\') {
                f.write_str("\\")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str("\"")
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.masked {
            MASK_PLACEHOLDER
        } else {
            self.value.as_str()
        };
        f.debug_struct("Arg")
            .field("value", &shown)
            .field("masked", &self.masked)
            .finish()
    }
}

/// An ordered program invocation.
///
/// The first argument is the program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    args: Vec<Arg>,
}

impl CommandLine {
    /// Start a command line with the given program.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            args: vec![Arg::plain(program)],
        }
    }

    /// Append a plain argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.push(value);
        self
    }

    /// Append several plain arguments.
    #[must_use]
    pub fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(values.into_iter().map(Arg::plain));
        self
    }

    /// Append a plain argument in place.
    pub fn push(&mut self, value: impl Into<String>) {
        self.args.push(Arg::plain(value));
    }

    /// Append a masked argument in place.
    pub fn push_masked(&mut self, value: impl Into<String>) {
        self.args.push(Arg::masked(value));
    }

    /// Return the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        self.args.first().map_or("", Arg::value)
    }

    /// Return every argument, program included.
    #[must_use]
    pub fn as_args(&self) -> &[Arg] {
        &self.args
    }

    /// Return the real argument vector handed to the process runner.
    #[must_use]
    pub fn to_argv(&self) -> Vec<String> {
        self.args.iter().map(|arg| arg.value.clone()).collect()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arg in &self.args {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{arg}")?;
        }
        Ok(())
    }
}

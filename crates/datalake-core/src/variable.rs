//! Typed scalar variables and their `name=value` text encoding.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

/// Number of digits printed after the decimal point for float values.
pub const FLOAT_PRECISION: usize = 3;

/// Type tag of a variable as seen by a data lake consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariableKind {
    /// Signed decimal integer.
    Integer,
    /// Fixed three-decimal float.
    Float,
    /// Lowercase `true` / `false`.
    Boolean,
    /// Raw text, sent unquoted.
    String,
    /// Text wrapped in double quotes, always read back as a string.
    QuotedString,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::QuotedString => "quoted-string",
        };
        f.pad(name)
    }
}

/// A scalar value carried by a [`Variable`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum VariableValue {
    /// Signed integer.
    Integer(i64),
    /// Float, rendered with [`FLOAT_PRECISION`] decimals.
    Float(f64),
    /// Boolean.
    Boolean(bool),
    /// Bare string.
    String(Cow<'static, str>),
    /// Quoted string.
    QuotedString(Cow<'static, str>),
}

impl VariableValue {
    /// The type tag of this value.
    pub fn kind(&self) -> VariableKind {
        match self {
            Self::Integer(_) => VariableKind::Integer,
            Self::Float(_) => VariableKind::Float,
            Self::Boolean(_) => VariableKind::Boolean,
            Self::String(_) => VariableKind::String,
            Self::QuotedString(_) => VariableKind::QuotedString,
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:.prec$}", prec = FLOAT_PRECISION),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::QuotedString(v) => write!(f, "\"{v}\""),
        }
    }
}

impl From<i64> for VariableValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for VariableValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for VariableValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

/// A named value, produced fresh for every emission.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Variable {
    /// Variable key as shown in the data lake.
    pub name: Cow<'static, str>,
    /// Typed value.
    #[serde(flatten)]
    pub value: VariableValue,
}

impl Variable {
    /// Create a variable.
    pub fn new(name: impl Into<Cow<'static, str>>, value: impl Into<VariableValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Same variable with `prefix` prepended to its name.
    #[must_use]
    pub fn with_prefix(self, prefix: &str) -> Self {
        if prefix.is_empty() {
            return self;
        }
        Self {
            name: Cow::Owned(format!("{prefix}{}", self.name)),
            value: self.value,
        }
    }

    /// Encode as a single wire message (`name=value`).
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

//! Parsing of `name=value` messages back into typed variables.
//!
//! Inference mirrors what a data lake consumer does with an untyped frame:
//! quotes force a string, then booleans, integers and finite floats are tried
//! in that order, and anything else is a bare string.

use std::borrow::Cow;

use crate::variable::{Variable, VariableValue};

/// Separator between a variable name and its value.
pub const SEPARATOR: char = '=';

/// Errors produced while parsing a wire message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The message has no `=` separator.
    #[error("missing '=' separator in message: {0:?}")]
    MissingSeparator(String),
    /// The part before `=` is empty.
    #[error("empty variable name in message: {0:?}")]
    EmptyName(String),
}

/// Parse one wire message into a [`Variable`].
///
/// The message is split at the first `=`, so values may themselves contain `=`.
pub fn parse_message(message: &str) -> Result<Variable, WireError> {
    let Some((name, raw)) = message.split_once(SEPARATOR) else {
        return Err(WireError::MissingSeparator(message.to_owned()));
    };
    if name.is_empty() {
        return Err(WireError::EmptyName(message.to_owned()));
    }
    Ok(Variable {
        name: Cow::Owned(name.to_owned()),
        value: infer_value(raw),
    })
}

/// Infer the typed value of a raw wire value.
pub fn infer_value(raw: &str) -> VariableValue {
    if let Some(inner) = unquote(raw) {
        return VariableValue::QuotedString(Cow::Owned(inner.to_owned()));
    }
    match raw {
        "true" => return VariableValue::Boolean(true),
        "false" => return VariableValue::Boolean(false),
        _ => {}
    }
    if let Ok(v) = raw.parse::<i64>() {
        return VariableValue::Integer(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => VariableValue::Float(v),
        _ => VariableValue::String(Cow::Owned(raw.to_owned())),
    }
}

fn unquote(raw: &str) -> Option<&str> {
    if raw.len() >= 2 {
        raw.strip_prefix('"')?.strip_suffix('"')
    } else {
        None
    }
}

use std::fmt;

use super::{ArgSpec, ArgType};
use crate::error::{ArgumentParseError, ExtractError, ExtractResult};

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl ArgValue {
    /// Coerces `token` into the type declared by `spec`.
    pub(crate) fn coerce(command: &str, spec: &ArgSpec, token: &str) -> Result<Self, ArgumentParseError> {
        let invalid = || ArgumentParseError::Invalid {
            command: command.to_string(),
            name: spec.name.clone(),
            token: token.to_string(),
            expected: spec.ty,
        };

        match spec.ty {
            ArgType::Int => token.parse().map(Self::Int).map_err(|_| invalid()),
            ArgType::Float => token.parse().map(Self::Float).map_err(|_| invalid()),
            ArgType::Bool => Ok(Self::Bool(parse_bool(token))),
            ArgType::String => Ok(Self::Str(token.to_string())),
        }
    }

    pub fn arg_type(&self) -> ArgType {
        match self {
            Self::Int(_) => ArgType::Int,
            Self::Float(_) => ArgType::Float,
            Self::Bool(_) => ArgType::Bool,
            Self::Str(_) => ArgType::String,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

/// `true`, `1` and `yes` (any case) are true; every other token is false.
fn parse_bool(token: &str) -> bool {
    ["true", "1", "yes"]
        .iter()
        .any(|t| token.eq_ignore_ascii_case(t))
}

/// The ordered, typed arguments of a parsed command.
///
/// Only supplied arguments are present; omitted optional arguments are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArgs {
    values: Vec<(String, ArgValue)>,
}

impl CommandArgs {
    pub(crate) fn push(&mut self, name: &str, value: ArgValue) {
        self.values.push((name.to_string(), value));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at `index`, in schema order.
    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.values.get(index).map(|(_, v)| v)
    }

    /// Returns the value of the argument called `name`.
    pub fn by_name(&self, name: &str) -> Option<&ArgValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns `true` if the argument called `name` was supplied.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name(name).is_some()
    }

    /// Iterates over the values in schema order.
    pub fn values(&self) -> impl Iterator<Item = &ArgValue> {
        self.values.iter().map(|(_, v)| v)
    }

    /// Iterates over `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    fn require<K: ArgKey>(&self, key: K) -> ExtractResult<&ArgValue> {
        key.lookup(self).ok_or_else(|| ExtractError::MissingArgument { name: key.label() })
    }

    fn mismatch<K: ArgKey>(key: K, expected: ArgType) -> ExtractError {
        ExtractError::ArgumentType {
            name: key.label(),
            expected,
        }
    }

    pub fn int<K: ArgKey>(&self, key: K) -> ExtractResult<i64> {
        match self.require(key)? {
            ArgValue::Int(v) => Ok(*v),
            _ => Err(Self::mismatch(key, ArgType::Int)),
        }
    }

    pub fn float<K: ArgKey>(&self, key: K) -> ExtractResult<f64> {
        match self.require(key)? {
            ArgValue::Float(v) => Ok(*v),
            _ => Err(Self::mismatch(key, ArgType::Float)),
        }
    }

    pub fn bool<K: ArgKey>(&self, key: K) -> ExtractResult<bool> {
        match self.require(key)? {
            ArgValue::Bool(v) => Ok(*v),
            _ => Err(Self::mismatch(key, ArgType::Bool)),
        }
    }

    pub fn str<K: ArgKey>(&self, key: K) -> ExtractResult<&str> {
        match self.require(key)? {
            ArgValue::Str(v) => Ok(v),
            _ => Err(Self::mismatch(key, ArgType::String)),
        }
    }
}

/// Addresses an argument either by name (`&str`) or by position (`usize`).
pub trait ArgKey: Copy {
    fn lookup<'a>(self, args: &'a CommandArgs) -> Option<&'a ArgValue>;

    /// Label used in error messages.
    fn label(self) -> String;
}

impl ArgKey for &str {
    fn lookup<'a>(self, args: &'a CommandArgs) -> Option<&'a ArgValue> {
        args.by_name(self)
    }

    fn label(self) -> String {
        self.to_string()
    }
}

impl ArgKey for usize {
    fn lookup<'a>(self, args: &'a CommandArgs) -> Option<&'a ArgValue> {
        args.get(self)
    }

    fn label(self) -> String {
        format!("#{self}")
    }
}

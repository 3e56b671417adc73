//! Commands with typed argument schemas.
//!
//! A [`Command`] is declared with an explicit, ordered argument schema. The
//! [`CommandRegistry`] turns raw message text into the matching command plus
//! its coerced [`CommandArgs`].
//!
//! ```rust,ignore
//! use courier_framework::command::{ArgType, Command, CommandRegistry};
//!
//! let mut registry = CommandRegistry::new();
//! registry.register(
//!     Command::new("buy", "Buy an asset", buy_handler)
//!         .arg("symbol", ArgType::String)
//!         .arg("amount", ArgType::Int),
//! );
//!
//! let parsed = registry.parse("/buy BTCUSD 100")?.unwrap();
//! assert_eq!(parsed.args.int("amount")?, 100);
//! ```

mod args;
mod registry;

use std::fmt;

use crate::handler::{BoxedHandler, Handler, into_handler};

pub use args::{ArgKey, ArgValue, CommandArgs};
pub use registry::{CommandRegistry, ParsedCommand};

/// Type tag of a command argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    Int,
    Float,
    Bool,
    String,
}

impl ArgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a command's argument schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub ty: ArgType,
    /// Optional arguments may be omitted by the user.
    pub optional: bool,
}

impl ArgSpec {
    fn placeholder(&self) -> String {
        if self.optional {
            format!("[{}]", self.name)
        } else {
            format!("<{}>", self.name)
        }
    }
}

/// A named command with its argument schema and handler.
///
/// Names are stored without the leading `/`.
#[derive(Clone)]
pub struct Command {
    name: String,
    description: String,
    args: Vec<ArgSpec>,
    handler: BoxedHandler,
}

impl Command {
    /// Creates a command with no arguments.
    pub fn new<H, T>(name: impl Into<String>, description: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        Self::from_boxed(name, description, into_handler(handler))
    }

    /// Creates a command from a pre-built boxed handler.
    pub fn from_boxed(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: BoxedHandler,
    ) -> Self {
        let name = name.into();
        Self {
            name: name.trim_start_matches('/').to_string(),
            description: description.into(),
            args: Vec::new(),
            handler,
        }
    }

    /// Appends a required argument to the schema.
    pub fn arg(mut self, name: impl Into<String>, ty: ArgType) -> Self {
        self.args.push(ArgSpec {
            name: name.into(),
            ty,
            optional: false,
        });
        self
    }

    /// Appends an optional argument to the schema.
    pub fn optional_arg(mut self, name: impl Into<String>, ty: ArgType) -> Self {
        self.args.push(ArgSpec {
            name: name.into(),
            ty,
            optional: true,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// Usage line, e.g. `/buy <symbol> <amount> [note]`.
    pub fn usage(&self) -> String {
        let mut usage = format!("/{}", self.name);
        for arg in &self.args {
            usage.push(' ');
            usage.push_str(&arg.placeholder());
        }
        usage
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_slash_stripped_from_name() {
        let cmd = Command::new("/status", "Show status", || async {});
        assert_eq!(cmd.name(), "status");
    }

    #[test]
    fn test_usage_placeholders() {
        let cmd = Command::new("buy", "Buy an asset", || async {})
            .arg("symbol", ArgType::String)
            .arg("amount", ArgType::Int)
            .optional_arg("limit", ArgType::Float);
        assert_eq!(cmd.usage(), "/buy <symbol> <amount> [limit]");
        assert_eq!(cmd.args().len(), 3);
        assert!(cmd.args()[2].optional);
    }
}

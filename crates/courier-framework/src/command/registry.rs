use std::collections::HashMap;
use std::fmt::Write as _;

use super::{ArgValue, Command, CommandArgs};
use crate::error::ArgumentParseError;

/// A command matched against raw text, with its coerced arguments.
#[derive(Debug, Clone)]
pub struct ParsedCommand<'a> {
    pub command: &'a Command,
    pub args: CommandArgs,
}

/// Named commands in registration order.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command.
    ///
    /// A command with the same name replaces the earlier one but keeps its
    /// place in the help listing.
    pub fn register(&mut self, command: Command) {
        match self.index.get(command.name()) {
            Some(&slot) => {
                tracing::debug!(command = command.name(), "Replacing command");
                self.commands[slot] = command;
            }
            None => {
                self.index
                    .insert(command.name().to_string(), self.commands.len());
                self.commands.push(command);
            }
        }
    }

    /// Looks up a command by name, without the leading `/`.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&slot| &self.commands[slot])
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterates over the commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Parses raw message text into a registered command and its arguments.
    ///
    /// Returns `Ok(None)` when the first token names no registered command.
    /// Tokens past the end of the schema are ignored.
    pub fn parse(&self, text: &str) -> Result<Option<ParsedCommand<'_>>, ArgumentParseError> {
        let mut tokens = text.split_whitespace();
        let Some(head) = tokens.next() else {
            return Ok(None);
        };
        let Some(command) = self.get(head.strip_prefix('/').unwrap_or(head)) else {
            return Ok(None);
        };

        let mut args = CommandArgs::default();
        for spec in command.args() {
            match tokens.next() {
                Some(token) => args.push(&spec.name, ArgValue::coerce(command.name(), spec, token)?),
                None if spec.optional => break,
                None => {
                    return Err(ArgumentParseError::Missing {
                        command: command.name().to_string(),
                        name: spec.name.clone(),
                    });
                }
            }
        }

        Ok(Some(ParsedCommand { command, args }))
    }

    /// Renders the command listing in registration order.
    pub fn help_text(&self) -> String {
        let mut help = String::from("Available commands:");
        for command in &self.commands {
            let _ = write!(help, "\n  {} - {}", command.usage(), command.description());
        }
        help
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ArgType;
    use tokio_test::assert_ok;

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("status", "Show bot status", || async {}));
        registry.register(
            Command::new("buy", "Buy an asset", || async {})
                .arg("symbol", ArgType::String)
                .arg("amount", ArgType::Int),
        );
        registry.register(
            Command::new("alert", "Set a price alert", || async {})
                .arg("symbol", ArgType::String)
                .arg("price", ArgType::Float)
                .optional_arg("repeat", ArgType::Bool),
        );
        registry
    }

    #[test]
    fn test_parse_typed_arguments() {
        let registry = registry();
        let parsed = assert_ok!(registry.parse("/buy BTCUSD 100")).unwrap();
        assert_eq!(parsed.command.name(), "buy");
        assert_eq!(
            parsed.args.values().cloned().collect::<Vec<_>>(),
            [ArgValue::Str("BTCUSD".to_string()), ArgValue::Int(100)]
        );
    }

    #[test]
    fn test_parse_without_slash_and_extra_whitespace() {
        let registry = registry();
        let parsed = assert_ok!(registry.parse("  buy   ETH\t7  trailing junk")).unwrap();
        assert_eq!(parsed.args.len(), 2);
        assert_eq!(parsed.args.int("amount").unwrap(), 7);
    }

    #[test]
    fn test_parse_unknown_or_empty() {
        let registry = registry();
        assert!(assert_ok!(registry.parse("/unknown x")).is_none());
        assert!(assert_ok!(registry.parse("")).is_none());
        assert!(assert_ok!(registry.parse("   ")).is_none());
        // Names are case-sensitive.
        assert!(assert_ok!(registry.parse("/BUY ETH 1")).is_none());
    }

    #[test]
    fn test_parse_invalid_int() {
        let registry = registry();
        let err = registry.parse("/buy ETH lots").unwrap_err();
        assert_eq!(
            err,
            ArgumentParseError::Invalid {
                command: "buy".to_string(),
                name: "amount".to_string(),
                token: "lots".to_string(),
                expected: ArgType::Int,
            }
        );
    }

    #[test]
    fn test_parse_missing_required() {
        let registry = registry();
        let err = registry.parse("/buy ETH").unwrap_err();
        assert_eq!(
            err,
            ArgumentParseError::Missing {
                command: "buy".to_string(),
                name: "amount".to_string(),
            }
        );
        assert_eq!(err.to_string(), "missing argument: amount");
    }

    #[test]
    fn test_parse_optional_and_bool() {
        let registry = registry();

        let parsed = assert_ok!(registry.parse("/alert BTC 65000.5")).unwrap();
        assert_eq!(parsed.args.len(), 2);
        assert!(!parsed.args.contains("repeat"));

        for (token, expected) in [("YES", true), ("1", true), ("true", true), ("nah", false)] {
            let parsed = assert_ok!(registry.parse(&format!("/alert BTC 1 {token}"))).unwrap();
            assert_eq!(parsed.args.bool("repeat").unwrap(), expected, "{token}");
        }
    }

    #[test]
    fn test_help_text_in_registration_order() {
        let registry = registry();
        assert_eq!(
            registry.help_text(),
            "Available commands:\n  \
             /status - Show bot status\n  \
             /buy <symbol> <amount> - Buy an asset\n  \
             /alert <symbol> <price> [repeat] - Set a price alert"
        );
    }

    #[test]
    fn test_reregister_overwrites_in_place() {
        let mut registry = registry();
        registry.register(Command::new("/status", "Show detailed status", || async {}));

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.iter().map(Command::name).collect::<Vec<_>>(),
            ["status", "buy", "alert"]
        );
        assert_eq!(
            registry.get("status").map(Command::description),
            Some("Show detailed status")
        );
    }
}

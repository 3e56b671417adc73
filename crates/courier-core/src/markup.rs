//! Outbound formatting options and inline keyboards.
//!
//! The dispatcher never inspects markup; it only forwards whatever a handler
//! attaches through [`ReplyOptions`] to the transport.

use serde::{Deserialize, Serialize};

/// How the platform should interpret the text of an outbound message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[default]
    Plain,
    Markdown,
    Html,
}

/// Formatting options attached to a reply or an edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyOptions {
    #[serde(default)]
    pub parse_mode: ParseMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<InlineKeyboard>,
}

impl ReplyOptions {
    /// Plain text, no keyboard.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Markdown-formatted text.
    pub fn markdown() -> Self {
        Self {
            parse_mode: ParseMode::Markdown,
            markup: None,
        }
    }

    /// HTML-formatted text.
    pub fn html() -> Self {
        Self {
            parse_mode: ParseMode::Html,
            markup: None,
        }
    }

    /// Attaches an inline keyboard.
    pub fn with_markup(mut self, markup: InlineKeyboard) -> Self {
        self.markup = Some(markup);
        self
    }
}

/// What pressing an [`InlineButton`] does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    /// Sends a callback event carrying this payload.
    CallbackData(String),
    /// Opens a URL.
    Url(String),
}

/// A single button of an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    #[serde(flatten)]
    pub action: ButtonAction,
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::CallbackData(data.into()),
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}

/// Rows of buttons attached below a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// Starts building a keyboard.
    pub fn builder() -> InlineKeyboardBuilder {
        InlineKeyboardBuilder::default()
    }

    /// A yes/no keyboard whose payloads are `<action>:yes` and `<action>:no`.
    pub fn confirm(action: &str) -> Self {
        Self::builder()
            .button("✅ Yes", format!("{action}:yes"))
            .button("❌ No", format!("{action}:no"))
            .build()
    }

    /// Iterates over every button, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.inline_keyboard.iter().flatten()
    }
}

/// Builder for [`InlineKeyboard`].
///
/// Buttons accumulate in the current row until [`row`](Self::row) is called.
#[derive(Debug, Default)]
pub struct InlineKeyboardBuilder {
    rows: Vec<Vec<InlineButton>>,
    current: Vec<InlineButton>,
}

impl InlineKeyboardBuilder {
    /// Adds a callback button to the current row.
    pub fn button(mut self, text: impl Into<String>, data: impl Into<String>) -> Self {
        self.current.push(InlineButton::callback(text, data));
        self
    }

    /// Adds a URL button to the current row.
    pub fn url_button(mut self, text: impl Into<String>, url: impl Into<String>) -> Self {
        self.current.push(InlineButton::url(text, url));
        self
    }

    /// Finishes the current row. Empty rows are skipped.
    pub fn row(mut self) -> Self {
        if !self.current.is_empty() {
            self.rows.push(std::mem::take(&mut self.current));
        }
        self
    }

    pub fn build(self) -> InlineKeyboard {
        let mut this = self.row();
        InlineKeyboard {
            inline_keyboard: std::mem::take(&mut this.rows),
        }
    }
}

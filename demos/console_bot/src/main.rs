//! Console Bot Demo
//!
//! A trading-style bot driven from the terminal. Every line typed on stdin
//! becomes an event:
//!
//! ```text
//! /price BTC              → command
//! /buy ETH 0.5            → command with typed arguments
//! cb trade:buy:ETH:0.5:yes → button press with that callback payload
//! ```
//!
//! Replies, callback acknowledgements and message edits are printed to
//! stdout; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-bot -- --whitelist 1,2 --admin 1
//! cargo run --package console-bot -- --config courier.toml --user 2
//! ```

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use clap::Parser;
use courier::core::ButtonAction;
use courier::prelude::*;
use courier::runtime::config::LogOutput;
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "console-bot", about = "Drive a Courier trading bot from the terminal")]
struct Cli {
    /// Configuration file to load instead of searching for courier.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile (development, production, ...).
    #[arg(short, long)]
    profile: Option<String>,

    /// Comma-separated user ids allowed to use the bot.
    #[arg(long, value_delimiter = ',')]
    whitelist: Option<Vec<i64>>,

    /// Comma-separated admin user ids.
    #[arg(long, value_delimiter = ',')]
    admin: Vec<i64>,

    /// User id attached to every typed line.
    #[arg(short, long, default_value_t = 1)]
    user: i64,
}

impl Cli {
    fn runtime(&self) -> Result<CourierRuntime> {
        // Keep stdout for the conversation unless the config says otherwise.
        let mut base = CourierConfig::default();
        base.logging.output = LogOutput::Stderr;

        let mut builder = CourierRuntime::builder().defaults(base);
        if let Some(path) = &self.config {
            builder = builder.config_file(path);
        }
        if let Some(profile) = &self.profile {
            builder = builder.profile(profile);
        }
        if let Some(ids) = &self.whitelist {
            builder = builder.set("access.whitelist", ids);
        }
        if !self.admin.is_empty() {
            builder = builder.set("access.admins", &self.admin);
        }

        Ok(builder.build()?)
    }
}

// ============================================================================
// Console Transport
// ============================================================================

/// Reads events from stdin and prints everything the bot sends.
struct ConsoleTransport {
    user: UserId,
    lines: Mutex<mpsc::UnboundedReceiver<String>>,
    next_ack: AtomicU64,
}

impl ConsoleTransport {
    fn new(user: UserId, lines: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            user,
            lines: Mutex::new(lines),
            next_ack: AtomicU64::new(1),
        }
    }

    fn spawn(user: UserId) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        // Stdin is read on a plain thread so that shutdown never waits on it.
        std::thread::spawn(move || forward_lines(std::io::stdin().lock(), &tx));

        Arc::new(Self::new(user, rx))
    }

    fn chat(&self) -> ChatId {
        ChatId(self.user.0)
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn receive(&self) -> TransportResult<Option<Event>> {
        let mut lines = self.lines.lock().await;
        while let Some(line) = lines.recv().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let event = match line.strip_prefix("cb ") {
                Some(payload) => {
                    let id = self.next_ack.fetch_add(1, Ordering::Relaxed);
                    let ack = AckHandle::new(format!("cb-{id}"));
                    Event::callback(self.user, self.chat(), payload.trim(), ack)
                }
                None => Event::command(self.user, self.chat(), line),
            };
            return Ok(Some(event));
        }
        Ok(None)
    }

    async fn reply(&self, chat: ChatId, text: &str, options: &ReplyOptions) -> TransportResult<()> {
        println!("[chat {chat}] {text}");
        print_keyboard(options);
        Ok(())
    }

    async fn acknowledge(&self, ack: &AckHandle, text: Option<&str>) -> TransportResult<()> {
        match text {
            Some(text) => println!("[{}] {text}", ack.callback_id),
            None => println!("[{}] ✓", ack.callback_id),
        }
        Ok(())
    }

    async fn edit(&self, ack: &AckHandle, text: &str, options: &ReplyOptions) -> TransportResult<()> {
        println!("[edit {}] {text}", ack.callback_id);
        print_keyboard(options);
        Ok(())
    }
}

/// Sends every line of `input` until it ends, fails, or the receiver is gone.
fn forward_lines(input: impl BufRead, tx: &mpsc::UnboundedSender<String>) {
    for line in input.lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                break;
            }
        }
    }
}

fn print_keyboard(options: &ReplyOptions) {
    let Some(keyboard) = &options.markup else {
        return;
    };
    for row in &keyboard.inline_keyboard {
        let buttons: Vec<_> = row
            .iter()
            .map(|b| match &b.action {
                ButtonAction::CallbackData(data) => format!("[{} → cb {data}]", b.text),
                ButtonAction::Url(url) => format!("[{} → {url}]", b.text),
            })
            .collect();
        println!("    {}", buttons.join("  "));
    }
}

// ============================================================================
// Handler Functions
// ============================================================================

const MARKETS: &[(&str, f64)] = &[("BTC", 67_250.0), ("ETH", 3_480.5), ("SOL", 142.25)];

fn quote(symbol: &str) -> Option<(&'static str, f64)> {
    MARKETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(symbol))
        .copied()
}

async fn status(ctx: MessageContext) -> HandlerResult {
    let role = if ctx.is_admin() { "admin" } else { "trader" };
    let text = format!(
        "🟢 Online\n\
        • User: {}\n\
        • Role: {role}\n\
        • Markets: {}",
        ctx.user_id(),
        MARKETS.len()
    );
    ctx.reply(&text).await?;
    Ok(())
}

async fn price(ctx: MessageContext, args: CommandArgs) -> Result<()> {
    let symbol = args.str("symbol")?;
    let Some((name, price)) = quote(symbol) else {
        bail!("unknown symbol {symbol}");
    };
    ctx.reply_markdown(&format!("*{name}*: {price:.2} USD")).await?;
    Ok(())
}

async fn buy(ctx: MessageContext, args: CommandArgs) -> Result<()> {
    let symbol = args.str("symbol")?;
    let amount = args.float("amount")?;
    if amount <= 0.0 {
        bail!("amount must be positive");
    }
    let Some((name, price)) = quote(symbol) else {
        bail!("unknown symbol {symbol}");
    };

    let keyboard = InlineKeyboard::confirm(&format!("trade:buy:{name}:{amount}"));
    let text = format!("Buy {amount} {name} for {:.2} USD?", amount * price);
    ctx.reply_with(&text, &ReplyOptions::plain().with_markup(keyboard))
        .await?;
    Ok(())
}

/// Only admins get past the `Admin` extractor.
async fn halt(Admin(user): Admin, ctx: MessageContext) -> HandlerResult {
    info!(user = %user.id, "Trading halted");
    ctx.reply(&format!("⏸ Trading halted by {}", user.id)).await?;
    Ok(())
}

/// Panics on purpose. The bot keeps serving other events.
async fn crash(ctx: MessageContext) -> HandlerResult {
    let orders: Vec<&str> = Vec::new();
    ctx.reply(orders[ctx.args().len()]).await?;
    Ok(())
}

/// Payload layout: `trade:<side>:<symbol>:<amount>:<yes|no>`.
async fn on_trade(cb: CallbackContext) -> Result<()> {
    let (Some(side), Some(symbol), Some(amount), Some(answer)) =
        (cb.segment(1), cb.segment(2), cb.segment(3), cb.segment(4))
    else {
        bail!("malformed trade payload");
    };

    match answer {
        "yes" => {
            cb.edit_message(
                &format!("✅ Order placed: {side} {amount} {symbol}"),
                &ReplyOptions::plain(),
            )
            .await?;
            cb.answer(Some("Order placed")).await?;
        }
        "no" => {
            cb.edit_message("Order cancelled", &ReplyOptions::plain()).await?;
            cb.answer(None).await?;
        }
        other => bail!("unknown answer {other}"),
    }
    Ok(())
}

async fn fallback(ctx: MessageContext) -> HandlerResult {
    ctx.reply("🤔 Unknown command. Try /help").await?;
    Ok(())
}

fn handlers() -> DispatcherBuilder {
    DispatcherBuilder::new()
        .command(Command::new("status", "Show bot status", status))
        .command(
            Command::new("price", "Show the price of a symbol", price)
                .arg("symbol", ArgType::String),
        )
        .command(
            Command::new("buy", "Buy an amount of a symbol", buy)
                .arg("symbol", ArgType::String)
                .arg("amount", ArgType::Float),
        )
        .command(Command::new("halt", "Halt trading (admin only)", halt))
        .command(Command::new("crash", "Simulate a crashing handler", crash))
        .callback("trade:", on_trade)
        .default_handler(fallback)
        .help_command("help", "Show this help")
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = cli.runtime()?;

    let transport = ConsoleTransport::spawn(UserId(cli.user));
    let dispatcher = runtime.dispatcher(handlers(), transport);

    println!("Type /help to list commands, `cb <payload>` to press a button, Ctrl+D to quit.");
    runtime.run(dispatcher).await?;

    let stats = runtime.stats().snapshot();
    info!(
        received = stats.received,
        handled = stats.handled,
        failed = stats.failed,
        unauthorized = stats.unauthorized,
        "Console bot stopped"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_forward_lines_sends_every_line() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        forward_lines(Cursor::new("/price BTC\n\ncb trade:buy:BTC:1:yes\n"), &tx);

        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        assert_eq!(lines, ["/price BTC", "", "cb trade:buy:BTC:1:yes"]);
    }

    #[test]
    fn test_forward_lines_stops_when_receiver_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        forward_lines(Cursor::new("/status\n/status\n"), &tx);
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_console_lines_become_events() {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = ConsoleTransport::new(UserId(7), rx);
        for line in ["  ", "/price BTC", "cb trade:buy:BTC:1:yes"] {
            tx.send(line.to_string()).unwrap();
        }
        drop(tx);

        let command = transport.receive().await.unwrap();
        assert_eq!(command, Some(Event::command(7, 7, "/price BTC")));

        let callback = transport.receive().await.unwrap();
        assert_eq!(
            callback,
            Some(Event::callback(7, 7, "trade:buy:BTC:1:yes", AckHandle::new("cb-1")))
        );

        assert_eq!(transport.receive().await.unwrap(), None);
    }
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use courier_core::{
    AckHandle, ChannelTransport, ChatId, Event, Outgoing, ReplyOptions, Transport, TransportError,
    TransportResult,
};
use courier_framework::{ArgType, CommandArgs, Command, DispatcherBuilder, HandlerResult, MessageContext};
use courier_runtime::{CourierConfig, CourierRuntime, RuntimeError};

fn config(grace_ms: u64, timeout_ms: Option<u64>) -> CourierConfig {
    let mut config = CourierConfig::default();
    config.dispatch.shutdown_grace_ms = grace_ms;
    config.dispatch.handler_timeout_ms = timeout_ms;
    config
}

async fn echo(ctx: MessageContext, args: CommandArgs) -> HandlerResult {
    ctx.reply(args.str("text")?).await?;
    Ok(())
}

async fn slow(ctx: MessageContext) -> HandlerResult {
    tokio::time::sleep(Duration::from_secs(10)).await;
    ctx.reply("done").await?;
    Ok(())
}

async fn stuck() {
    tokio::time::sleep(Duration::from_secs(3600)).await;
}

fn handlers() -> DispatcherBuilder {
    DispatcherBuilder::new()
        .command(Command::new("echo", "Echo text", echo).arg("text", ArgType::String))
        .command(Command::new("slow", "Slow", slow))
        .command(Command::new("stuck", "Never finishes", stuck))
}

#[tokio::test]
async fn test_processes_events_until_stream_ends() {
    let runtime = CourierRuntime::from_config(config(5000, Some(30_000)));
    let (transport, tx) = ChannelTransport::new();
    let dispatcher = runtime.dispatcher(handlers(), transport.clone());

    tx.send(Event::command(1, 10, "/echo hello")).unwrap();
    tx.send(Event::command(1, 10, "/echo")).unwrap();
    tx.send(Event::command(2, 20, "/echo world")).unwrap();
    drop(tx);

    runtime
        .run_until(dispatcher, std::future::pending())
        .await
        .unwrap();

    let stats = runtime.stats().snapshot();
    assert_eq!(stats.received, 3);
    assert_eq!(stats.handled, 2);
    assert_eq!(stats.invalid, 1);

    let mut texts: Vec<_> = transport
        .outgoing()
        .iter()
        .filter_map(|o| o.text().map(str::to_string))
        .collect();
    texts.sort();
    assert_eq!(texts.len(), 3);
    assert!(texts.contains(&"hello".to_string()));
    assert!(texts.contains(&"world".to_string()));
    assert!(texts.iter().any(|t| t.contains("Usage: /echo <text>")));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_in_flight_handlers() {
    let runtime = CourierRuntime::from_config(config(60_000, None));
    let (transport, tx) = ChannelTransport::new();
    let dispatcher = runtime.dispatcher(handlers(), transport.clone());

    tx.send(Event::command(1, 10, "/slow")).unwrap();
    drop(tx);

    runtime
        .run_until(dispatcher, std::future::pending())
        .await
        .unwrap();

    assert_eq!(runtime.stats().snapshot().handled, 1);
    assert_eq!(runtime.in_flight(), 0);
    assert!(matches!(
        transport.outgoing().as_slice(),
        [Outgoing::Reply { text, .. }] if text == "done"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_slow_handler_does_not_delay_next_event() {
    let runtime = CourierRuntime::from_config(config(60_000, None));
    let (transport, tx) = ChannelTransport::new();
    let dispatcher = runtime.dispatcher(handlers(), transport.clone());

    tx.send(Event::command(1, 10, "/slow")).unwrap();
    tx.send(Event::command(1, 10, "/echo fast")).unwrap();
    drop(tx);

    runtime
        .run_until(dispatcher, std::future::pending())
        .await
        .unwrap();

    let order: Vec<_> = transport
        .outgoing()
        .iter()
        .filter_map(|o| o.text().map(str::to_string))
        .collect();
    assert_eq!(order, ["fast", "done"]);
    assert_eq!(runtime.stats().snapshot().handled, 2);
}

#[tokio::test(start_paused = true)]
async fn test_grace_period_bounds_shutdown() {
    let runtime = CourierRuntime::from_config(config(100, None));
    let (transport, tx) = ChannelTransport::new();
    let dispatcher = runtime.dispatcher(handlers(), transport);

    tx.send(Event::command(1, 10, "/stuck")).unwrap();
    drop(tx);

    let started = tokio::time::Instant::now();
    runtime
        .run_until(dispatcher, std::future::pending())
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    let stats = runtime.stats().snapshot();
    assert_eq!(stats.received, 1);
    assert_eq!(stats.completed(), 0);
    assert_eq!(runtime.in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_future_stops_receiving() {
    let runtime = CourierRuntime::from_config(config(5000, Some(30_000)));
    let (transport, tx) = ChannelTransport::new();
    let dispatcher = runtime.dispatcher(handlers(), transport.clone());

    tx.send(Event::command(1, 10, "/echo one")).unwrap();
    tx.send(Event::command(1, 10, "/echo two")).unwrap();

    runtime
        .run_until(dispatcher, tokio::time::sleep(Duration::from_secs(1)))
        .await
        .unwrap();

    // Sender is still alive, so only the shutdown future ended the loop.
    tx.send(Event::command(1, 10, "/echo three")).unwrap();
    assert_eq!(runtime.stats().snapshot().received, 2);
    assert_eq!(transport.outgoing().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_configured_timeout_fails_handler() {
    let runtime = CourierRuntime::from_config(config(5000, Some(50)));
    let (transport, tx) = ChannelTransport::new();
    let dispatcher = runtime.dispatcher(handlers(), transport.clone());

    tx.send(Event::command(1, 10, "/stuck")).unwrap();
    drop(tx);

    runtime
        .run_until(dispatcher, std::future::pending())
        .await
        .unwrap();

    assert_eq!(runtime.stats().snapshot().failed, 1);
    let outgoing = transport.outgoing();
    assert_eq!(outgoing.len(), 1);
    assert!(outgoing[0].text().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_whitelist_from_config() {
    let mut config = config(5000, Some(30_000));
    config.access.whitelist = Some(vec![1]);
    let runtime = CourierRuntime::from_config(config);
    let (transport, tx) = ChannelTransport::new();
    let dispatcher = runtime.dispatcher(handlers(), transport.clone());

    tx.send(Event::command(2, 20, "/echo hi")).unwrap();
    drop(tx);

    runtime
        .run_until(dispatcher, std::future::pending())
        .await
        .unwrap();

    assert_eq!(runtime.stats().snapshot().unauthorized, 1);
    assert!(matches!(
        transport.outgoing().as_slice(),
        [Outgoing::Reply { chat: ChatId(20), text, .. }] if text.contains("not authorized")
    ));
}

struct BrokenTransport;

#[async_trait]
impl Transport for BrokenTransport {
    async fn receive(&self) -> TransportResult<Option<Event>> {
        Err(TransportError::closed("connection reset"))
    }

    async fn reply(&self, _: ChatId, _: &str, _: &ReplyOptions) -> TransportResult<()> {
        Ok(())
    }

    async fn acknowledge(&self, _: &AckHandle, _: Option<&str>) -> TransportResult<()> {
        Ok(())
    }

    async fn edit(&self, _: &AckHandle, _: &str, _: &ReplyOptions) -> TransportResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_receive_error_is_returned() {
    let runtime = CourierRuntime::from_config(config(5000, Some(30_000)));
    let dispatcher = runtime.dispatcher(handlers(), Arc::new(BrokenTransport));

    let result = runtime.run_until(dispatcher, std::future::pending()).await;

    assert!(matches!(
        result,
        Err(RuntimeError::Transport(TransportError::Closed { .. }))
    ));
    assert_eq!(runtime.stats().snapshot().received, 0);
}

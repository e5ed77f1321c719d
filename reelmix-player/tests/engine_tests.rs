//! Player engine pump tests
//!
//! Runs the real async pump with a manually driven ticker and asserts the
//! controller observes widget events and poll ticks in order.

mod helpers;

use chrono::Utc;
use helpers::{entry_of, interview, FakeWidget};
use reelmix_common::clock::ManualClock;
use reelmix_common::config::EngineConfig;
use reelmix_common::events::ClipState;
use reelmix_player::player::ticker::ManualTicker;
use reelmix_player::player::{ClipController, PlayerEngine, WidgetEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

struct PumpFixture {
    engine: Arc<PlayerEngine>,
    widget: FakeWidget,
    event_tx: mpsc::UnboundedSender<WidgetEvent>,
    tick_tx: mpsc::UnboundedSender<()>,
}

fn start_pump() -> PumpFixture {
    let widget = FakeWidget::new();
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let (broadcast_tx, _) = broadcast::channel(256);
    let controller = ClipController::new(
        Box::new(widget.clone()),
        EngineConfig::default(),
        clock,
        broadcast_tx,
    );

    let engine = Arc::new(PlayerEngine::new(controller));
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (tick_tx, ticker) = ManualTicker::new();
    engine.start(event_rx, Box::new(ticker));

    PumpFixture {
        engine,
        widget,
        event_tx,
        tick_tx,
    }
}

/// Poll the snapshot until `predicate` holds or two seconds elapse
async fn wait_for<F>(engine: &PlayerEngine, predicate: F)
where
    F: Fn(&reelmix_player::player::engine::PlaybackSnapshot) -> bool,
{
    for _ in 0..200 {
        if predicate(&engine.snapshot()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("snapshot condition not reached, last: {:?}", engine.snapshot());
}

#[tokio::test]
async fn test_pump_delivers_widget_events() {
    let pump = start_pump();
    let person = interview("baker");

    pump.engine
        .begin_with_first(entry_of(&person, "00:30 - 01:30", &["sit-ins"]));
    assert_eq!(pump.engine.snapshot().state, ClipState::Loading);

    pump.widget.set_duration(600.0);
    pump.event_tx.send(WidgetEvent::Ready).unwrap();

    wait_for(&pump.engine, |s| s.state == ClipState::Playing).await;
    pump.engine.stop();
}

#[tokio::test]
async fn test_pump_samples_position_on_ticks() {
    let pump = start_pump();
    let person = interview("baker");

    pump.engine
        .begin_with_first(entry_of(&person, "00:30 - 01:30", &["sit-ins"]));
    pump.widget.set_duration(600.0);
    pump.event_tx.send(WidgetEvent::Ready).unwrap();
    wait_for(&pump.engine, |s| s.state == ClipState::Playing).await;

    pump.widget.set_current_time(50.0);
    pump.tick_tx.send(()).unwrap();
    wait_for(&pump.engine, |s| s.relative_secs == 20.0).await;
    pump.engine.stop();
}

#[tokio::test]
async fn test_closing_event_channel_stops_pump() {
    let pump = start_pump();
    let person = interview("baker");

    pump.engine
        .begin_with_first(entry_of(&person, "00:30 - 01:30", &["sit-ins"]));
    drop(pump.event_tx);

    // The pump exits; direct engine calls still work against the controller
    tokio::time::sleep(Duration::from_millis(20)).await;
    pump.engine.pause();
    assert_eq!(pump.engine.snapshot().queue_len, 1);
}

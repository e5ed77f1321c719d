//! Bounded-interval poll abstraction
//!
//! The widget exposes only pull-based time queries, so playback position
//! is sampled on a recurring tick. Keeping the tick source behind a trait
//! lets tests drive the controller tick-by-tick and would let a push-based
//! time source replace polling without touching the state machine.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Source of recurring poll ticks
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick
    async fn tick(&mut self);
}

/// Tokio interval ticker used in production
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        // Skip missed ticks rather than bursting after a stall
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Manually driven ticker for tests
pub struct ManualTicker {
    rx: tokio::sync::mpsc::UnboundedReceiver<()>,
}

impl ManualTicker {
    pub fn new() -> (tokio::sync::mpsc::UnboundedSender<()>, Self) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) {
        // A closed channel parks forever; tests always hold the sender
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

//! Clip playback coordination
//!
//! The controller is a synchronous state machine over the external media
//! widget; the engine wraps it in async plumbing (widget event pump, poll
//! ticker, broadcast events).

pub mod controller;
pub mod engine;
pub mod ticker;
pub mod widget;

pub use controller::ClipController;
pub use engine::PlayerEngine;
pub use ticker::{IntervalTicker, Ticker};
pub use widget::{MediaWidget, RemoteWidget, WidgetCommand, WidgetEvent};

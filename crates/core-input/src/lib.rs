//! Terminal input: crossterm events translated into `core_events::Event`
//! and forwarded to the host loop by a background tokio task.

mod async_service;
mod key_map;

pub use async_service::AsyncInputShutdown;

use core_events::Event;
use tokio::task::JoinHandle;

/// Spawn the async input service backed by `crossterm::EventStream`.
///
/// Returns the `JoinHandle` for the background task alongside a shutdown handle
/// that can be used to request immediate termination.
pub fn spawn_async_input(
    sender: tokio::sync::mpsc::Sender<Event>,
) -> (JoinHandle<()>, AsyncInputShutdown) {
    async_service::spawn_async_event_task(sender)
}

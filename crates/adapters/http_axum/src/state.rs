//! Shared application state for axum handlers.

use std::sync::Arc;

use kelvin_app::event_bus::InProcessEventBus;
use kelvin_app::status_board::StatusBoard;

/// Application state shared across all axum handlers.
///
/// Handlers only read: the dispatcher owns the lights and keeps the board
/// up to date.
#[derive(Clone)]
pub struct AppState {
    /// Latest snapshot of every light.
    pub board: StatusBoard,
    /// Bus the SSE stream subscribes to.
    pub event_bus: Arc<InProcessEventBus>,
}

impl AppState {
    pub fn new(board: StatusBoard, event_bus: Arc<InProcessEventBus>) -> Self {
        Self { board, event_bus }
    }
}

//! # kelvin-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Bulb` — read and write one physical light
//!   - `SunTimesProvider` — sunrise/sunset for a date
//!   - `EventPublisher` — publish structured light events
//! - Define **driving/inbound** use-cases:
//!   - `LightService` — one light paired with its bulb, polled once per tick
//!   - `Dispatcher` — the polling loop over every light
//! - Provide **in-process infrastructure** (event bus, event logger, status
//!   board) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `kelvin-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod event_logger;
pub mod ports;
pub mod services;
pub mod status_board;

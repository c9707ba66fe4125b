//! # kelvin-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a read-only **JSON status API** (`/api/lights`, `/api/lights/{id}`)
//! - Stream light events to clients as **Server-Sent Events**
//!   (`/api/events/stream`)
//! - Map application errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `kelvin-app` (status board, event bus) and `kelvin-domain`
//! (for the types it serializes). Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

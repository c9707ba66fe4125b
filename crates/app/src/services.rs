//! Use-case services — application-level orchestration.
//!
//! Each service receives its port implementations via generics
//! and exposes high-level operations that the dispatcher and the
//! composition root call.

pub mod dispatcher;
pub mod light_service;

pub use dispatcher::{Dispatcher, TickReport};
pub use light_service::LightService;

//! # kelvin-domain
//!
//! Pure domain model for the kelvin circadian lighting daemon.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **light states** (color temperature + brightness, either optional)
//! - Define **intervals** and **schedules** (a day's ordered, interpolated plan)
//! - Define **schedule definitions** (the configured plan, turned into a
//!   schedule for one date from externally supplied sun times)
//! - Define the per-light **state machine** as a pure decision function
//! - Define **events** (structured records of light transitions)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod event;
pub mod light;
pub mod light_state;
pub mod schedule;

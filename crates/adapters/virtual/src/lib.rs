//! # kelvin-adapter-virtual
//!
//! Simulated bulbs and fixed sun times for testing and demonstration.
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`VirtualBulb`] | `Bulb` | In-memory light; stores colour temperature in mireds like a real bulb |
//! | [`FixedSunTimes`] | `SunTimesProvider` | Same sunrise and sunset every day |
//!
//! ## Dependency rule
//!
//! Depends on `kelvin-app` (port traits) and `kelvin-domain` only.

mod bulb;
mod error;
mod sun_times;

pub use bulb::VirtualBulb;
pub use error::VirtualBulbError;
pub use sun_times::FixedSunTimes;

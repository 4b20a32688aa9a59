//! Slot computation engine
//!
//! Merges busy intervals from appointments, manual blocks and the external
//! calendar, then walks the working-hours window to produce bookable slots.

pub mod intervals;
pub mod ports;
mod service;

pub use service::AvailabilityService;

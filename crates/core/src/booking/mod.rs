//! Booking transaction coordinator

pub mod ports;
mod service;

pub use service::{BookingRequest, BookingService};

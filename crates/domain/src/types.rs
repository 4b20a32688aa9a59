//! Common data types used throughout the application

pub mod appointment;
pub mod availability;
pub mod credential;
pub mod outbox;

pub use appointment::*;
pub use availability::*;
pub use credential::*;
pub use outbox::*;

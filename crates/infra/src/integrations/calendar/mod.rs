//! External calendar provider integration
//!
//! OAuth connection lifecycle, mirrored-event CRUD and the free/busy view
//! used by the slot computation engine. Every provider call is bounded by a
//! timeout and independently fault-tolerant: a provider failure never blocks
//! or rolls back a booking.

mod busy;
mod client;
mod oauth;
mod state_token;
mod types;

pub use busy::ExternalCalendarBusySource;
pub use client::CalendarApiClient;
pub use oauth::CalendarOAuthManager;
pub use state_token::StateTokenSigner;
pub use types::TokenResponse;

//! # Bookslot API
//!
//! HTTP surface of the booking engine. Thin handlers over the core
//! services; role gating happens here via request headers, standing in for
//! the external identity layer.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;

//! # Bookslot Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Database implementations (SQLite via r2d2/rusqlite)
//! - The external calendar integration (OAuth, event CRUD, free/busy)
//! - The calendar sync outbox worker
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `bookslot-core`
//! - Depends on `bookslot-domain` and `bookslot-core`
//! - Contains all "impure" code (I/O, HTTP, storage)

pub mod config;
pub mod database;
pub mod integrations;
pub mod observability;
pub mod sync;

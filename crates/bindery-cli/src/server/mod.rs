//! Read-only HTTP API over a loaded collection.

pub mod app;
pub mod error;
pub mod handlers;
pub mod query;
pub mod state;

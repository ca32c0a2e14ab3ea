//! CLI command implementations.

pub mod dupes;
pub mod enrich;
pub mod merge;
pub mod resort;
pub mod serve;
pub mod validate;

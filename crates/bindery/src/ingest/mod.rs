//! Source adapters: map native library exports into records.
//!
//! Each adapter owns one export format and produces plain [`Record`]s with
//! provenance stamped into `sources`. Nothing downstream ever sees a native
//! schema.
//!
//! [`Record`]: crate::record::Record

mod goodreads;
mod kindle;
mod shelf_text;

pub use goodreads::load_goodreads_export;
pub use kindle::load_kindle_export;
pub use shelf_text::{load_shelf_inventory, parse_shelf_lines};

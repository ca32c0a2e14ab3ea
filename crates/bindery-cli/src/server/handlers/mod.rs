//! API request handlers.

mod books;
mod meta;
mod search;

pub use books::*;
pub use meta::*;
pub use search::*;

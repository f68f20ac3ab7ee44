//! API request handlers.

mod autocomplete;
mod categories;
mod search;

pub use autocomplete::*;
pub use categories::*;
pub use search::*;

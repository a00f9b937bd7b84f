//! Model types for the APIs this crate ships clients for.

mod photo;

pub use photo::*;

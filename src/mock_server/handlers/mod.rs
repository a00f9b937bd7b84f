//! HTTP request handlers for the mock server.

pub mod flickr;
pub mod items;
pub mod status;

pub use flickr::*;
pub use items::*;
pub use status::*;

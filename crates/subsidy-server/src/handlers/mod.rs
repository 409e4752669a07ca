//! HTTP request handlers organized by area
//!
//! Each submodule contains handlers for a specific part of the site or API.

pub mod pages;
pub mod search;
pub mod sessions;
pub mod system;

// Re-export all handlers for use in router
pub use pages::*;
pub use search::*;
pub use sessions::*;
pub use system::*;

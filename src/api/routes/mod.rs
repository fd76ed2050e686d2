//! Route handlers for the REST API
//!
//! - [`download`] - Download a media URL and hand back a signed link
//! - [`system`] - Health and OpenAPI

mod download;
mod system;

pub use download::*;
pub use system::*;

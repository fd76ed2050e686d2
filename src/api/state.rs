//! Application state for the API server

use crate::relay::Relay;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone). The relay holds the storage
/// client and downloader handle built at startup.
#[derive(Clone)]
pub struct AppState {
    /// The download-and-deliver pipeline
    pub relay: Arc<Relay>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(relay: Arc<Relay>) -> Self {
        Self { relay }
    }
}

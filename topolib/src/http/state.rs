//! Application state for the HTTP server.

use std::sync::Arc;

use crate::engine::DefaultEngine;
use crate::functions::Functions;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Function registry; calls run on the blocking pool.
    pub functions: Arc<Functions<DefaultEngine>>,
}

impl AppState {
    pub fn new(functions: Arc<Functions<DefaultEngine>>) -> Self {
        Self { functions }
    }
}

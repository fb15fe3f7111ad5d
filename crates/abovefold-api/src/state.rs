//! Shared handler state.

use std::sync::Arc;

use abovefold_core::Extractor;

/// State shared by every route handler.
#[derive(Clone)]
pub struct ApiState {
    pub extractor: Arc<Extractor>,
}

impl ApiState {
    pub fn new(extractor: Arc<Extractor>) -> Self {
        Self { extractor }
    }
}

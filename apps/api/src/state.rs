use std::sync::Arc;

use crate::config::Config;
use crate::refinement::AbstractRefiner;
use crate::submissions::store::SubmissionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: SubmissionStore,
    /// Pluggable refiner. `LlmAbstractRefiner` when an API key is configured.
    pub refiner: Arc<dyn AbstractRefiner>,
    pub config: Config,
}

use std::sync::Arc;

use crate::jobs::JobRegistry;
use crate::llm_client::CompletionService;
use crate::profiles::ProfileStore;
use crate::store::FileStore;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub llm: Arc<dyn CompletionService>,
    pub store: Arc<FileStore>,
    pub jobs: JobRegistry,
}

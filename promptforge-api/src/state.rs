//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use promptforge_core::Store;
use promptforge_llm::CompletionProvider;

use crate::config::ApiConfig;

/// Store handle shared by every route.
pub type SharedStore = Arc<dyn Store>;

/// Model provider shared by the generation route.
pub type SharedProvider = Arc<dyn CompletionProvider>;

/// Application-wide state. The store is created once at startup and handed
/// in here; nothing else holds it.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub llm: SharedProvider,
    pub config: Arc<ApiConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: SharedStore, llm: SharedProvider, config: ApiConfig) -> Self {
        Self {
            store,
            llm,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(SharedStore, store);
crate::impl_from_ref!(SharedProvider, llm);
crate::impl_from_ref!(Arc<ApiConfig>, config);
crate::impl_from_ref!(Instant, start_time);

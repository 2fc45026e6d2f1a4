use std::sync::Arc;

use crate::config::Config;
use crate::mail::Mailer;
use crate::profiles::ProfileStore;
use crate::tokens::TokenRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenRegistry,
    pub profiles: ProfileStore,
    /// Log-only when no mail API is configured.
    pub mailer: Arc<dyn Mailer>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// Fully in-process state around the given clock and mailer.
    pub fn in_memory(
        config: Config,
        clock: Arc<dyn crate::clock::Clock>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        use crate::profiles::InMemoryProfileRepository;
        use crate::tokens::InMemoryTokenStore;

        AppState {
            tokens: TokenRegistry::new(Arc::new(InMemoryTokenStore::new()), clock.clone()),
            profiles: ProfileStore::new(Arc::new(InMemoryProfileRepository::new()), clock),
            mailer,
            config,
        }
    }
}

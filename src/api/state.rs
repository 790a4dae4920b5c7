use std::sync::Arc;
use std::time::Duration;

use crate::{
    db::{CandidateStore, SessionStore},
    services::{providers::HistoryProvider, HistoryFetcher, RecommendationAssembler},
};

/// Shared application state
///
/// The candidate store is read-only and shared without locking; session
/// slots are the only mutable state.
#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<RecommendationAssembler>,
    pub history_provider: Arc<dyn HistoryProvider>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(
        history_provider: Arc<dyn HistoryProvider>,
        store: Arc<dyn CandidateStore>,
        sessions: Arc<dyn SessionStore>,
        provider_timeout: Duration,
        genre_timeout: Duration,
    ) -> Self {
        let fetcher = HistoryFetcher::new(history_provider.clone(), provider_timeout)
            .with_genre_timeout(genre_timeout);

        Self {
            assembler: Arc::new(RecommendationAssembler::new(fetcher, store)),
            history_provider,
            sessions,
        }
    }
}

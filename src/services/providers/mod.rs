/// Listening-history provider abstraction
///
/// A provider returns the user's most played tracks for one lookback window.
/// Fallback across windows lives in `services::history`, not here.
use crate::{
    error::AppResult,
    models::{ListenerProfile, ListeningHistoryItem, TimeWindow},
};

pub mod spotify;

pub use spotify::SpotifyHistoryProvider;

/// Trait for listening-history providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Up to `limit` top tracks for the window
    ///
    /// An empty list means the provider has no history for that window.
    /// Artists may come back without genres; see `attach_genres`.
    async fn top_tracks(
        &self,
        access_token: &str,
        window: TimeWindow,
        limit: usize,
    ) -> AppResult<Vec<ListeningHistoryItem>>;

    /// Fills in missing artist genres
    ///
    /// Providers whose track listings already carry genres need nothing here.
    async fn attach_genres(
        &self,
        _access_token: &str,
        _items: &mut [ListeningHistoryItem],
    ) -> AppResult<()> {
        Ok(())
    }

    /// The account behind the access token
    async fn current_user(&self, access_token: &str) -> AppResult<ListenerProfile>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

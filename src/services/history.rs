use std::sync::Arc;
use std::time::Duration;

use crate::{
    models::{ListeningHistoryItem, TimeWindow},
    services::providers::HistoryProvider,
};

/// Tracks requested per window attempt
pub const HISTORY_LIMIT: usize = 20;

/// Outcome of a history fetch
///
/// `window` is `None` when every window came back empty or failed; that is a
/// valid "no history" result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedHistory {
    pub items: Vec<ListeningHistoryItem>,
    pub window: Option<TimeWindow>,
}

impl FetchedHistory {
    pub fn none() -> Self {
        Self {
            items: Vec::new(),
            window: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_none()
    }
}

/// Fetches listening history, falling back from recent to all-time windows
///
/// Windows are tried one at a time in `TimeWindow::FALLBACK_ORDER`; the
/// first non-empty one wins. A failed or timed-out attempt is logged and the
/// next window is tried.
///
/// Genre lookup for the winning window runs afterwards under its own timeout.
/// It never costs the window its tracks: on failure the artists keep empty
/// genre lists.
pub struct HistoryFetcher {
    provider: Arc<dyn HistoryProvider>,
    windows: Vec<TimeWindow>,
    attempt_timeout: Duration,
    genre_timeout: Duration,
}

impl HistoryFetcher {
    pub fn new(provider: Arc<dyn HistoryProvider>, attempt_timeout: Duration) -> Self {
        Self {
            provider,
            windows: TimeWindow::FALLBACK_ORDER.to_vec(),
            attempt_timeout,
            genre_timeout: attempt_timeout,
        }
    }

    pub fn with_genre_timeout(mut self, genre_timeout: Duration) -> Self {
        self.genre_timeout = genre_timeout;
        self
    }

    pub async fn fetch(&self, access_token: &str) -> FetchedHistory {
        for &window in &self.windows {
            let attempt = tokio::time::timeout(
                self.attempt_timeout,
                self.provider.top_tracks(access_token, window, HISTORY_LIMIT),
            )
            .await;

            match attempt {
                Ok(Ok(mut items)) if !items.is_empty() => {
                    tracing::info!(
                        window = %window,
                        tracks = items.len(),
                        provider = self.provider.name(),
                        "Listening history found"
                    );
                    self.enrich(access_token, &mut items, window).await;
                    return FetchedHistory {
                        items,
                        window: Some(window),
                    };
                }
                Ok(Ok(_)) => {
                    tracing::info!(window = %window, "No listening history in window");
                }
                Ok(Err(e)) => {
                    tracing::warn!(window = %window, error = %e, "History window fetch failed");
                }
                Err(_) => {
                    tracing::warn!(
                        window = %window,
                        timeout_ms = self.attempt_timeout.as_millis() as u64,
                        "History window fetch timed out"
                    );
                }
            }
        }

        tracing::warn!("No listening history across all windows");
        FetchedHistory::none()
    }

    async fn enrich(
        &self,
        access_token: &str,
        items: &mut [ListeningHistoryItem],
        window: TimeWindow,
    ) {
        let lookup = tokio::time::timeout(
            self.genre_timeout,
            self.provider.attach_genres(access_token, items),
        )
        .await;

        match lookup {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(window = %window, error = %e, "Artist genre lookup failed");
            }
            Err(_) => {
                tracing::warn!(
                    window = %window,
                    timeout_ms = self.genre_timeout.as_millis() as u64,
                    "Artist genre lookup timed out"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::models::{HistoryArtist, ListenerProfile};
    use crate::services::providers::MockHistoryProvider;
    use mockall::predicate::{always, eq};
    use mockall::Sequence;

    fn items(artist: &str, n: usize) -> Vec<ListeningHistoryItem> {
        (0..n)
            .map(|i| {
                ListeningHistoryItem::new(
                    format!("track-{}", i),
                    vec![HistoryArtist::new(artist, vec![])],
                )
            })
            .collect()
    }

    /// Mock whose genre lookup succeeds without changes
    fn provider() -> MockHistoryProvider {
        let mut mock = MockHistoryProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_attach_genres().returning(|_, _| Ok(()));
        mock
    }

    fn fetcher(mock: MockHistoryProvider) -> HistoryFetcher {
        HistoryFetcher::new(Arc::new(mock), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_recent_window_wins_without_further_calls() {
        let mut mock = provider();
        mock.expect_top_tracks()
            .with(always(), eq(TimeWindow::Recent), eq(HISTORY_LIMIT))
            .times(1)
            .returning(|_, _, _| Ok(items("X", 3)));

        let history = fetcher(mock).fetch("token").await;
        assert_eq!(history.window, Some(TimeWindow::Recent));
        assert_eq!(history.items.len(), 3);
    }

    #[tokio::test]
    async fn test_failure_falls_through_to_next_window() {
        let mut seq = Sequence::new();
        let mut mock = provider();
        mock.expect_top_tracks()
            .with(always(), eq(TimeWindow::Recent), always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(AppError::Provider("502".to_string())));
        mock.expect_top_tracks()
            .with(always(), eq(TimeWindow::Medium), always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(Vec::new()));
        mock.expect_top_tracks()
            .with(always(), eq(TimeWindow::Long), always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(items("Y", 20)));

        let history = fetcher(mock).fetch("token").await;
        assert_eq!(history.window, Some(TimeWindow::Long));
        assert_eq!(history.items.len(), 20);
    }

    #[tokio::test]
    async fn test_all_windows_empty_is_no_history() {
        let mut mock = provider();
        mock.expect_top_tracks()
            .times(3)
            .returning(|_, _, _| Ok(Vec::new()));

        let history = fetcher(mock).fetch("token").await;
        assert!(history.is_empty());
        assert_eq!(history, FetchedHistory::none());
    }

    #[tokio::test]
    async fn test_all_windows_failing_is_no_history() {
        let mut mock = provider();
        mock.expect_top_tracks()
            .times(3)
            .returning(|_, _, _| Err(AppError::Provider("unavailable".to_string())));

        let history = fetcher(mock).fetch("token").await;
        assert!(history.is_empty());
    }

    struct SlowRecentProvider;

    #[async_trait::async_trait]
    impl HistoryProvider for SlowRecentProvider {
        async fn top_tracks(
            &self,
            _access_token: &str,
            window: TimeWindow,
            _limit: usize,
        ) -> AppResult<Vec<ListeningHistoryItem>> {
            if window == TimeWindow::Recent {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(items("Z", 2))
        }

        async fn current_user(&self, _access_token: &str) -> AppResult<ListenerProfile> {
            Err(AppError::Provider("unused".to_string()))
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    /// Answers top tracks quickly but stalls on the genre lookup
    struct SlowGenreProvider;

    #[async_trait::async_trait]
    impl HistoryProvider for SlowGenreProvider {
        async fn top_tracks(
            &self,
            _access_token: &str,
            _window: TimeWindow,
            _limit: usize,
        ) -> AppResult<Vec<ListeningHistoryItem>> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(items("W", 4))
        }

        async fn attach_genres(
            &self,
            _access_token: &str,
            _items: &mut [ListeningHistoryItem],
        ) -> AppResult<()> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }

        async fn current_user(&self, _access_token: &str) -> AppResult<ListenerProfile> {
            Err(AppError::Provider("unused".to_string()))
        }

        fn name(&self) -> &'static str {
            "slow-genres"
        }
    }

    #[tokio::test]
    async fn test_timeout_treated_as_failed_window() {
        let fetcher = HistoryFetcher::new(Arc::new(SlowRecentProvider), Duration::from_millis(20));
        let history = fetcher.fetch("token").await;
        assert_eq!(history.window, Some(TimeWindow::Medium));
        assert_eq!(history.items.len(), 2);
    }

    #[tokio::test]
    async fn test_slow_genre_lookup_keeps_window() {
        let fetcher = HistoryFetcher::new(Arc::new(SlowGenreProvider), Duration::from_millis(200))
            .with_genre_timeout(Duration::from_millis(20));

        let history = fetcher.fetch("token").await;
        assert_eq!(history.window, Some(TimeWindow::Recent));
        assert_eq!(history.items.len(), 4);
        assert!(history.items[0].artists[0].genres.is_empty());
    }

    #[tokio::test]
    async fn test_failed_genre_lookup_keeps_window() {
        let mut mock = MockHistoryProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_top_tracks()
            .times(1)
            .returning(|_, _, _| Ok(items("X", 3)));
        mock.expect_attach_genres()
            .times(1)
            .returning(|_, _| Err(AppError::Provider("429".to_string())));

        let history = fetcher(mock).fetch("token").await;
        assert_eq!(history.window, Some(TimeWindow::Recent));
        assert_eq!(history.items.len(), 3);
    }

    #[tokio::test]
    async fn test_genres_attached_to_winning_window() {
        let mut mock = MockHistoryProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_top_tracks()
            .times(1)
            .returning(|_, _, _| Ok(items("X", 2)));
        mock.expect_attach_genres().times(1).returning(|_, items| {
            for artist in items.iter_mut().flat_map(|item| item.artists.iter_mut()) {
                artist.genres = vec!["trip-hop".to_string()];
            }
            Ok(())
        });

        let history = fetcher(mock).fetch("token").await;
        assert!(history
            .items
            .iter()
            .all(|item| item.artists[0].genres == vec!["trip-hop".to_string()]));
    }
}

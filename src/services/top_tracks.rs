use crate::{
    error::AppResult,
    models::{ListeningHistoryItem, TimeWindow},
    services::{history::HISTORY_LIMIT, providers::HistoryProvider},
};
use std::sync::Arc;

/// The user's top tracks over the medium window
///
/// Unlike recommendation history fetching there is no fallback here: a
/// provider failure is returned to the caller. Genres are still best effort.
pub async fn top_tracks(
    provider: Arc<dyn HistoryProvider>,
    access_token: &str,
) -> AppResult<Vec<ListeningHistoryItem>> {
    let mut tracks = provider
        .top_tracks(access_token, TimeWindow::Medium, HISTORY_LIMIT)
        .await?;

    if let Err(e) = provider.attach_genres(access_token, &mut tracks).await {
        tracing::warn!(error = %e, "Artist genre lookup failed for top tracks");
    }

    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::HistoryArtist;
    use crate::services::providers::MockHistoryProvider;
    use mockall::predicate::{always, eq};

    #[tokio::test]
    async fn test_medium_window_only_and_genre_failure_tolerated() {
        let mut mock = MockHistoryProvider::new();
        mock.expect_top_tracks()
            .with(always(), eq(TimeWindow::Medium), eq(HISTORY_LIMIT))
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![ListeningHistoryItem::new(
                    "Teardrop",
                    vec![HistoryArtist::new("Massive Attack", Vec::new())],
                )])
            });
        mock.expect_attach_genres()
            .times(1)
            .returning(|_, _| Err(AppError::Provider("503".to_string())));

        let tracks = top_tracks(Arc::new(mock), "token").await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].track_name, "Teardrop");
    }

    #[tokio::test]
    async fn test_provider_failure_is_returned() {
        let mut mock = MockHistoryProvider::new();
        mock.expect_top_tracks()
            .returning(|_, _, _| Err(AppError::Provider("502".to_string())));

        let result = top_tracks(Arc::new(mock), "token").await;
        tokio_test::assert_err!(result);
    }
}

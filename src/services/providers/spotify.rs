/// Spotify Web API history provider
///
/// API Flow:
/// 1. Top tracks: /me/top/tracks?time_range=...&limit=... → tracks with
///    simplified artists (no genres)
/// 2. Genres: /artists?ids=... (up to 50 ids per call) → full artist objects
/// 3. Account: /me → the listener's profile
///
/// Genre lookup is a separate call so callers can bound it independently of
/// the top-tracks request.
use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{
        ListenerProfile, ListeningHistoryItem, SpotifyArtists, SpotifyTopTracks, TimeWindow,
    },
    services::providers::HistoryProvider,
};

/// Maximum artist ids accepted by one /artists call
const ARTIST_BATCH_SIZE: usize = 50;

#[derive(Clone)]
pub struct SpotifyHistoryProvider {
    http_client: HttpClient,
    api_url: String,
}

impl SpotifyHistoryProvider {
    pub fn new(api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        access_token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                path = path,
                body = %body,
                "Spotify API request failed"
            );
            return Err(AppError::Provider(format!(
                "Spotify API returned status {}",
                status
            )));
        }

        Ok(response.json().await?)
    }

    /// Resolves genres for the given artist ids
    async fn fetch_genres(
        &self,
        access_token: &str,
        ids: &[String],
    ) -> AppResult<HashMap<String, Vec<String>>> {
        let mut genres = HashMap::new();
        for batch in ids.chunks(ARTIST_BATCH_SIZE) {
            let page: SpotifyArtists = self
                .get_json(access_token, "/artists", &[("ids", batch.join(","))])
                .await?;

            for artist in page.artists.into_iter().flatten() {
                if let (Some(id), Some(artist_genres)) = (artist.id, artist.genres) {
                    genres.insert(id, artist_genres);
                }
            }
        }

        Ok(genres)
    }
}

/// Distinct ids of artists still missing genres, in first-seen order
fn artists_without_genres(items: &[ListeningHistoryItem]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in items
        .iter()
        .flat_map(|item| item.artists.iter())
        .filter(|artist| artist.genres.is_empty())
        .filter_map(|artist| artist.id.clone())
    {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Fills missing artist genres from the lookup table
fn fill_genres(items: &mut [ListeningHistoryItem], genres: &HashMap<String, Vec<String>>) {
    for artist in items.iter_mut().flat_map(|item| item.artists.iter_mut()) {
        if !artist.genres.is_empty() {
            continue;
        }
        if let Some(found) = artist.id.as_ref().and_then(|id| genres.get(id)) {
            artist.genres = found.clone();
        }
    }
}

#[async_trait::async_trait]
impl HistoryProvider for SpotifyHistoryProvider {
    async fn top_tracks(
        &self,
        access_token: &str,
        window: TimeWindow,
        limit: usize,
    ) -> AppResult<Vec<ListeningHistoryItem>> {
        let page: SpotifyTopTracks = self
            .get_json(
                access_token,
                "/me/top/tracks",
                &[
                    ("limit", limit.to_string()),
                    ("time_range", window.as_query_value().to_string()),
                ],
            )
            .await?;

        tracing::info!(
            window = %window,
            tracks = page.items.len(),
            provider = "spotify",
            "Top tracks fetched"
        );

        Ok(page.items.into_iter().map(ListeningHistoryItem::from).collect())
    }

    async fn attach_genres(
        &self,
        access_token: &str,
        items: &mut [ListeningHistoryItem],
    ) -> AppResult<()> {
        let ids = artists_without_genres(items);
        if ids.is_empty() {
            return Ok(());
        }

        let genres = self.fetch_genres(access_token, &ids).await?;
        fill_genres(items, &genres);

        tracing::debug!(artists = ids.len(), resolved = genres.len(), "Artist genres attached");
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> AppResult<ListenerProfile> {
        self.get_json(access_token, "/me", &[]).await
    }

    fn name(&self) -> &'static str {
        "spotify"
    }
}

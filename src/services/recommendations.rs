use chrono::Utc;
use std::sync::Arc;

use crate::{
    db::CandidateStore,
    error::{AppError, AppResult},
    models::{
        ListeningHistoryItem, PreferenceProfile, Recommendation, RecommendationResult, SongId,
        TimeWindow,
    },
    services::{
        history::HistoryFetcher,
        profile::build_profile,
        scoring::SCORED_LIMIT,
    },
};

/// Size of a full recommendation list
pub const RECOMMENDATION_COUNT: usize = 20;

/// Scored lists shorter than this are padded with random songs
pub const PADDING_THRESHOLD: usize = 10;

pub const NO_HISTORY_MESSAGE: &str = "No listening history found. Listen to some music on your \
     streaming account to get personalized recommendations!";

/// Generates song recommendations from listening history
///
/// Runs fetch → profile → score → pad. A user without history gets a random
/// sample of the catalog. Any failure after the fetch aborts the whole
/// request; partial lists are never returned.
pub struct RecommendationAssembler {
    fetcher: HistoryFetcher,
    store: Arc<dyn CandidateStore>,
}

impl RecommendationAssembler {
    pub fn new(fetcher: HistoryFetcher, store: Arc<dyn CandidateStore>) -> Self {
        Self { fetcher, store }
    }

    pub async fn assemble(&self, access_token: &str) -> AppResult<RecommendationResult> {
        let history = self.fetcher.fetch(access_token).await;

        let result = match history.window {
            None => self.random_fallback().await,
            Some(window) => self.personalized(&history.items, window).await,
        };

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                store = self.store.name(),
                "Error generating recommendations"
            );
            match e {
                AppError::Store(_) => e,
                other => AppError::Internal(other.to_string()),
            }
        })
    }

    async fn random_fallback(&self) -> AppResult<RecommendationResult> {
        tracing::warn!("Returning random recommendations for user without history");

        let recommendations: Vec<Recommendation> = self
            .store
            .sample(RECOMMENDATION_COUNT)
            .await?
            .into_iter()
            .map(Recommendation::from)
            .collect();

        Ok(RecommendationResult {
            recommendations,
            user_preferences: PreferenceProfile::neutral().summary(),
            message: Some(NO_HISTORY_MESSAGE.to_string()),
            time_window: None,
            generated_at: Utc::now(),
        })
    }

    async fn personalized(
        &self,
        items: &[ListeningHistoryItem],
        window: TimeWindow,
    ) -> AppResult<RecommendationResult> {
        let profile = build_profile(items, self.store.as_ref()).await?;

        tracing::info!(
            window = %window,
            top_artists = ?profile.summary().top_artists,
            avg_energy = profile.avg_energy,
            avg_danceability = profile.avg_danceability,
            avg_valence = profile.avg_valence,
            "Generating recommendations"
        );

        let scored = self.store.score_candidates(&profile, SCORED_LIMIT).await?;
        log_scored(&profile, &scored);

        let mut recommendations: Vec<Recommendation> =
            scored.into_iter().map(Recommendation::from).collect();

        if recommendations.len() < PADDING_THRESHOLD {
            let missing = RECOMMENDATION_COUNT - recommendations.len();
            let selected: Vec<SongId> = recommendations.iter().map(Recommendation::id).collect();

            tracing::info!(
                scored = recommendations.len(),
                padding = missing,
                "Too few matches, padding with random songs"
            );

            let padding = self.store.sample_excluding(&selected, missing).await?;
            recommendations.extend(padding.into_iter().map(Recommendation::from));
        }

        recommendations.truncate(RECOMMENDATION_COUNT);

        Ok(RecommendationResult {
            recommendations,
            user_preferences: profile.summary(),
            message: None,
            time_window: Some(window),
            generated_at: Utc::now(),
        })
    }
}

fn log_scored(profile: &PreferenceProfile, scored: &[crate::models::ScoredCandidate]) {
    let artist_matches = scored
        .iter()
        .filter(|s| profile.has_artist(&s.song.artist))
        .count();

    match scored.first() {
        Some(top) => tracing::info!(
            matches = scored.len(),
            artist_matches,
            top_track = %top.song.track,
            top_artist = %top.song.artist,
            top_score = top.score,
            "Scored recommendations"
        ),
        None => tracing::info!("No catalog songs matched the profile"),
    }
}

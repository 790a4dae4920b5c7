use std::collections::HashSet;

use crate::{
    db::CandidateStore,
    error::AppResult,
    models::{
        profile::UNMATCHED_FEATURE_DEFAULT, CandidateSong, ListeningHistoryItem,
        PreferenceProfile,
    },
};

/// Corpus songs read when averaging the user's audio features
pub const ARTIST_MATCH_LIMIT: usize = 100;

/// Builds a taste profile from listening history
///
/// Artists and genres come straight from the history. The three feature
/// averages come from corpus songs by those artists.
pub async fn build_profile(
    items: &[ListeningHistoryItem],
    store: &dyn CandidateStore,
) -> AppResult<PreferenceProfile> {
    if items.is_empty() {
        return Ok(PreferenceProfile::neutral());
    }

    let top_artists = dedup(
        items
            .iter()
            .flat_map(|item| item.artists.iter())
            .map(|artist| artist.name.clone()),
    );
    let top_genres = dedup(
        items
            .iter()
            .flat_map(|item| item.artists.iter())
            .flat_map(|artist| artist.genres.iter().cloned()),
    );

    let matches = store
        .find_by_artists(&top_artists, ARTIST_MATCH_LIMIT)
        .await?;

    tracing::info!(
        artists = top_artists.len(),
        genres = top_genres.len(),
        corpus_matches = matches.len(),
        "Matched favorite artists against catalog"
    );

    let (avg_energy, avg_danceability, avg_valence) = if matches.is_empty() {
        tracing::info!("No favorite artists in catalog, using default feature values");
        (
            UNMATCHED_FEATURE_DEFAULT,
            UNMATCHED_FEATURE_DEFAULT,
            UNMATCHED_FEATURE_DEFAULT,
        )
    } else {
        (
            mean(&matches, |s| s.energy),
            mean(&matches, |s| s.danceability),
            mean(&matches, |s| s.valence),
        )
    };

    Ok(PreferenceProfile::with_averages(
        top_artists,
        top_genres,
        avg_energy,
        avg_danceability,
        avg_valence,
    ))
}

/// Removes duplicates, keeping first-seen order
fn dedup(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(v.clone())).collect()
}

/// Mean of a feature; a song lacking it contributes 0.6
fn mean(songs: &[CandidateSong], feature: impl Fn(&CandidateSong) -> Option<f64>) -> f64 {
    let total: f64 = songs
        .iter()
        .map(|s| feature(s).unwrap_or(UNMATCHED_FEATURE_DEFAULT))
        .sum();
    total / songs.len() as f64
}

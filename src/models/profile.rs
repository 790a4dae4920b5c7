use serde::{Deserialize, Serialize};

/// Feature average used when the user has no listening history at all
pub const NO_HISTORY_FEATURE_DEFAULT: f64 = 0.5;

/// Feature average used when the user's artists are absent from the corpus,
/// and per record when a matched song lacks the feature
pub const UNMATCHED_FEATURE_DEFAULT: f64 = 0.6;

/// Number of artists and genres reported back to the caller
pub const SUMMARY_LIMIT: usize = 5;

/// A user's taste profile derived from listening history
///
/// Artists and genres are deduplicated and keep first-seen order so the
/// caller-facing summary is deterministic. The three averages always lie in
/// [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    pub top_artists: Vec<String>,
    pub top_genres: Vec<String>,
    pub avg_energy: f64,
    pub avg_danceability: f64,
    pub avg_valence: f64,
}

impl PreferenceProfile {
    /// Profile for a user with no listening history
    pub fn neutral() -> Self {
        Self::with_averages(
            Vec::new(),
            Vec::new(),
            NO_HISTORY_FEATURE_DEFAULT,
            NO_HISTORY_FEATURE_DEFAULT,
            NO_HISTORY_FEATURE_DEFAULT,
        )
    }

    pub fn with_averages(
        top_artists: Vec<String>,
        top_genres: Vec<String>,
        avg_energy: f64,
        avg_danceability: f64,
        avg_valence: f64,
    ) -> Self {
        Self {
            top_artists,
            top_genres,
            avg_energy: avg_energy.clamp(0.0, 1.0),
            avg_danceability: avg_danceability.clamp(0.0, 1.0),
            avg_valence: avg_valence.clamp(0.0, 1.0),
        }
    }

    pub fn has_artist(&self, artist: &str) -> bool {
        self.top_artists.iter().any(|a| a == artist)
    }

    /// Caller-facing view capped at five artists and genres
    pub fn summary(&self) -> PreferenceSummary {
        PreferenceSummary {
            top_artists: self.top_artists.iter().take(SUMMARY_LIMIT).cloned().collect(),
            top_genres: self.top_genres.iter().take(SUMMARY_LIMIT).cloned().collect(),
            avg_energy: self.avg_energy,
            avg_danceability: self.avg_danceability,
            avg_valence: self.avg_valence,
        }
    }
}

/// Profile as returned in the `userPreferences` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSummary {
    pub top_artists: Vec<String>,
    pub top_genres: Vec<String>,
    pub avg_energy: f64,
    pub avg_danceability: f64,
    pub avg_valence: f64,
}

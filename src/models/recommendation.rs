use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CandidateSong, PreferenceSummary, ScoredCandidate, SongId, TimeWindow};

/// One entry of a recommendation list
///
/// Entries that came from the scored query carry their score; random
/// fallback and padding entries do not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(flatten)]
    pub song: CandidateSong,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Recommendation {
    pub fn id(&self) -> SongId {
        self.song.id
    }
}

impl From<ScoredCandidate> for Recommendation {
    fn from(scored: ScoredCandidate) -> Self {
        Self {
            song: scored.song,
            score: Some(scored.score),
        }
    }
}

impl From<CandidateSong> for Recommendation {
    fn from(song: CandidateSong) -> Self {
        Self { song, score: None }
    }
}

/// Result of a single recommendation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub recommendations: Vec<Recommendation>,
    pub user_preferences: PreferenceSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// History window the profile was built from; absent when there was none
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    pub generated_at: DateTime<Utc>,
}

/// Energy, danceability and valence as a 3-vector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AudioFeatures {
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
}

impl AudioFeatures {
    pub fn new(energy: f64, danceability: f64, valence: f64) -> Self {
        Self {
            energy,
            danceability,
            valence,
        }
    }

    pub fn distance(&self, other: &AudioFeatures) -> f64 {
        let de = self.energy - other.energy;
        let dd = self.danceability - other.danceability;
        let dv = self.valence - other.valence;
        (de * de + dd * dd + dv * dv).sqrt()
    }
}

impl From<&PreferenceSummary> for AudioFeatures {
    fn from(summary: &PreferenceSummary) -> Self {
        Self::new(
            summary.avg_energy,
            summary.avg_danceability,
            summary.avg_valence,
        )
    }
}

/// How closely a recommendation list matches the profile it was built for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityReport {
    /// `(1 - distance / sqrt(3)) * 100`, one decimal
    pub similarity_score: f64,
    pub energy_delta: f64,
    pub danceability_delta: f64,
    pub valence_delta: f64,
    pub profile_features: AudioFeatures,
    pub recommendation_features: AudioFeatures,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscored_recommendation_omits_score() {
        let rec = Recommendation::from(CandidateSong::new("Hello", "Adele"));
        let value = serde_json::to_value(&rec).unwrap();
        assert!(value.get("score").is_none());
        assert_eq!(value["artist"], "Adele");
        assert!(value["id"].is_string());
    }

    #[test]
    fn test_feature_distance() {
        let zero = AudioFeatures::new(0.0, 0.0, 0.0);
        let one = AudioFeatures::new(1.0, 1.0, 1.0);
        assert!((zero.distance(&one) - 3f64.sqrt()).abs() < 1e-12);
        assert_eq!(one.distance(&one), 0.0);
    }
}

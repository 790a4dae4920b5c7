use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Identifier of a song in the candidate corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct SongId(pub Uuid);

impl SongId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SongId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SongId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A song from the candidate corpus with precomputed audio features
///
/// Features are optional; an absent feature counts as 0 when scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSong {
    #[serde(default)]
    pub id: SongId,
    pub track: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub danceability: Option<f64>,
    #[serde(default)]
    pub valence: Option<f64>,
}

impl CandidateSong {
    pub fn new(track: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: SongId::new(),
            track: track.into(),
            artist: artist.into(),
            album: None,
            energy: None,
            danceability: None,
            valence: None,
        }
    }

    pub fn with_features(mut self, energy: f64, danceability: f64, valence: f64) -> Self {
        self.energy = Some(energy);
        self.danceability = Some(danceability);
        self.valence = Some(valence);
        self
    }
}

/// A corpus song together with its match score against a profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub song: CandidateSong,
    pub score: f64,
}

use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod profile;
pub mod recommendation;
pub mod song;

pub use profile::{PreferenceProfile, PreferenceSummary};
pub use recommendation::{AudioFeatures, Recommendation, RecommendationResult, SimilarityReport};
pub use song::{CandidateSong, ScoredCandidate, SongId};

/// Lookback window of the listening-history provider
///
/// Variants are declared in fallback order: most recent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    /// Roughly the last four weeks
    #[serde(rename = "short_term")]
    Recent,
    /// Roughly the last six months
    #[serde(rename = "medium_term")]
    Medium,
    /// All time
    #[serde(rename = "long_term")]
    Long,
}

impl TimeWindow {
    /// Windows in the order they are tried
    pub const FALLBACK_ORDER: [TimeWindow; 3] =
        [TimeWindow::Recent, TimeWindow::Medium, TimeWindow::Long];

    /// Value of the provider's `time_range` query parameter
    pub fn as_query_value(&self) -> &'static str {
        match self {
            TimeWindow::Recent => "short_term",
            TimeWindow::Medium => "medium_term",
            TimeWindow::Long => "long_term",
        }
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_query_value())
    }
}

/// An artist credited on a played track
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryArtist {
    /// Provider artist id, used to look up genres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl HistoryArtist {
    pub fn new(name: impl Into<String>, genres: Vec<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            genres,
        }
    }
}

/// One track from the user's listening history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListeningHistoryItem {
    pub track_name: String,
    pub artists: Vec<HistoryArtist>,
}

impl ListeningHistoryItem {
    pub fn new(track_name: impl Into<String>, artists: Vec<HistoryArtist>) -> Self {
        Self {
            track_name: track_name.into(),
            artists,
        }
    }
}

// ============================================================================
// Spotify Web API Types
// ============================================================================

/// Page returned by GET /me/top/tracks
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTopTracks {
    #[serde(default)]
    pub items: Vec<SpotifyTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
}

/// Artist object; track listings carry the simplified form without genres
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

/// Response of GET /artists?ids=...
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtists {
    #[serde(default)]
    pub artists: Vec<Option<SpotifyArtist>>,
}

/// Profile returned by GET /me, passed through to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListenerProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpotifyImage {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

impl From<SpotifyTrack> for ListeningHistoryItem {
    fn from(track: SpotifyTrack) -> Self {
        let artists = track
            .artists
            .into_iter()
            .map(|artist| HistoryArtist {
                id: artist.id,
                name: artist.name,
                genres: artist.genres.unwrap_or_default(),
            })
            .collect();

        ListeningHistoryItem {
            track_name: track.name,
            artists,
        }
    }
}

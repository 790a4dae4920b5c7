/// Candidate corpus abstraction
///
/// The corpus is read-only for the lifetime of the process. Two backends are
/// provided: PostgreSQL, which evaluates the scoring rule in a single SQL
/// query, and an in-memory corpus loaded from a JSON file.
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{CandidateSong, PreferenceProfile, ScoredCandidate, SongId},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryCandidateStore;
pub use postgres::PgCandidateStore;

/// Trait for candidate song stores
#[async_trait::async_trait]
pub trait CandidateStore: Send + Sync {
    /// Songs whose artist exactly matches one of `artists`, in corpus order
    async fn find_by_artists(
        &self,
        artists: &[String],
        limit: usize,
    ) -> AppResult<Vec<CandidateSong>>;

    /// Songs selected and ranked against the profile, best match first
    ///
    /// Ties keep corpus insertion order.
    async fn score_candidates(
        &self,
        profile: &PreferenceProfile,
        limit: usize,
    ) -> AppResult<Vec<ScoredCandidate>>;

    /// Uniform random sample of up to `size` distinct songs
    async fn sample(&self, size: usize) -> AppResult<Vec<CandidateSong>>;

    /// Uniform random sample of up to `size` distinct songs not in `exclude`
    async fn sample_excluding(
        &self,
        exclude: &[SongId],
        size: usize,
    ) -> AppResult<Vec<CandidateSong>>;

    /// Number of songs in the corpus
    async fn count(&self) -> AppResult<u64>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Reads a JSON array of songs, keeping file order
///
/// Songs without an `id` get a fresh random one.
pub async fn read_catalog_file(path: impl AsRef<Path>) -> AppResult<Vec<CandidateSong>> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::Internal(format!("Failed to read catalog {}: {}", path.display(), e))
    })?;

    let songs: Vec<CandidateSong> = serde_json::from_str(&raw).map_err(|e| {
        AppError::Internal(format!("Failed to parse catalog {}: {}", path.display(), e))
    })?;

    tracing::info!(path = %path.display(), songs = songs.len(), "Read song catalog file");
    Ok(songs)
}

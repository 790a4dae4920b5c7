/// In-memory candidate corpus
///
/// Holds the whole corpus in insertion order. Scoring is a scan that
/// pre-filters by the selection rule and stable-sorts the survivors, so ties
/// keep corpus order exactly as the PostgreSQL store does with `seq`.
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::{
    db::catalog::{read_catalog_file, CandidateStore},
    error::AppResult,
    models::{CandidateSong, PreferenceProfile, ScoredCandidate, SongId},
    services::scoring,
};

#[derive(Clone, Default)]
pub struct MemoryCandidateStore {
    songs: Arc<Vec<CandidateSong>>,
}

impl MemoryCandidateStore {
    pub fn new(songs: Vec<CandidateSong>) -> Self {
        Self {
            songs: Arc::new(songs),
        }
    }

    /// Loads a corpus from a JSON array of songs
    pub async fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let songs = read_catalog_file(path).await?;
        Ok(Self::new(songs))
    }

    fn pick<'a>(pool: &[&'a CandidateSong], size: usize) -> Vec<CandidateSong> {
        let mut rng = rand::thread_rng();
        pool.choose_multiple(&mut rng, size)
            .map(|song| (*song).clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn find_by_artists(
        &self,
        artists: &[String],
        limit: usize,
    ) -> AppResult<Vec<CandidateSong>> {
        let wanted: HashSet<&str> = artists.iter().map(String::as_str).collect();

        Ok(self
            .songs
            .iter()
            .filter(|song| wanted.contains(song.artist.as_str()))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn score_candidates(
        &self,
        profile: &PreferenceProfile,
        limit: usize,
    ) -> AppResult<Vec<ScoredCandidate>> {
        Ok(scoring::rank(self.songs.iter(), profile, limit))
    }

    async fn sample(&self, size: usize) -> AppResult<Vec<CandidateSong>> {
        let pool: Vec<&CandidateSong> = self.songs.iter().collect();
        Ok(Self::pick(&pool, size))
    }

    async fn sample_excluding(
        &self,
        exclude: &[SongId],
        size: usize,
    ) -> AppResult<Vec<CandidateSong>> {
        let excluded: HashSet<SongId> = exclude.iter().copied().collect();
        let pool: Vec<&CandidateSong> = self
            .songs
            .iter()
            .filter(|song| !excluded.contains(&song.id))
            .collect();

        Ok(Self::pick(&pool, size))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.songs.len() as u64)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

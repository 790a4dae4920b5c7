//! Candidate selection and match scoring
//!
//! The PostgreSQL store evaluates the same rule inside a single SQL query
//! (see `db::catalog::postgres`). These functions are the in-process form,
//! used by the in-memory corpus and by tests.

use crate::models::{CandidateSong, PreferenceProfile, ScoredCandidate};

/// Maximum number of scored candidates returned
pub const SCORED_LIMIT: usize = 20;

/// Maximum feature distance for the feature-based selection criteria
pub const FEATURE_TOLERANCE: f64 = 0.3;

pub const ARTIST_WEIGHT: f64 = 10.0;
pub const ENERGY_WEIGHT: f64 = 5.0;
pub const DANCEABILITY_WEIGHT: f64 = 5.0;
pub const VALENCE_WEIGHT: f64 = 3.0;

/// Absolute gap between a song's feature and the profile average
///
/// A missing feature counts as 0.
fn gap(feature: Option<f64>, average: f64) -> f64 {
    (feature.unwrap_or(0.0) - average).abs()
}

/// Whether a song is eligible for scoring against the profile
///
/// A song qualifies when its artist is a favorite, or when both energy and
/// danceability are close to the profile, or when valence is close.
pub fn qualifies(song: &CandidateSong, profile: &PreferenceProfile) -> bool {
    if profile.has_artist(&song.artist) {
        return true;
    }

    let energy_close = gap(song.energy, profile.avg_energy) <= FEATURE_TOLERANCE;
    let dance_close = gap(song.danceability, profile.avg_danceability) <= FEATURE_TOLERANCE;
    let valence_close = gap(song.valence, profile.avg_valence) <= FEATURE_TOLERANCE;

    (energy_close && dance_close) || valence_close
}

/// Match score of a song against the profile; higher is better
///
/// Ranges over [0, 23] for features in [0, 1]. The value is a ranking key
/// only and is not normalized.
pub fn score(song: &CandidateSong, profile: &PreferenceProfile) -> f64 {
    let artist = if profile.has_artist(&song.artist) {
        ARTIST_WEIGHT
    } else {
        0.0
    };

    artist
        + ENERGY_WEIGHT * (1.0 - gap(song.energy, profile.avg_energy))
        + DANCEABILITY_WEIGHT * (1.0 - gap(song.danceability, profile.avg_danceability))
        + VALENCE_WEIGHT * (1.0 - gap(song.valence, profile.avg_valence))
}

/// Filters, scores and ranks songs given in corpus order
///
/// The sort is stable: songs with equal scores keep their corpus order.
pub fn rank<'a, I>(songs: I, profile: &PreferenceProfile, limit: usize) -> Vec<ScoredCandidate>
where
    I: IntoIterator<Item = &'a CandidateSong>,
{
    let mut scored: Vec<ScoredCandidate> = songs
        .into_iter()
        .filter(|song| qualifies(song, profile))
        .map(|song| ScoredCandidate {
            score: score(song, profile),
            song: song.clone(),
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(artists: &[&str], e: f64, d: f64, v: f64) -> PreferenceProfile {
        PreferenceProfile::with_averages(
            artists.iter().map(|a| a.to_string()).collect(),
            Vec::new(),
            e,
            d,
            v,
        )
    }

    fn song(artist: &str, e: f64, d: f64, v: f64) -> CandidateSong {
        CandidateSong::new(format!("{} song", artist), artist).with_features(e, d, v)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_max_score_is_23() {
        let p = profile(&["X"], 0.7, 0.4, 0.2);
        let s = song("X", 0.7, 0.4, 0.2);
        assert!(approx(score(&s, &p), 23.0));
    }

    #[test]
    fn test_min_score_is_0() {
        let p = profile(&[], 1.0, 1.0, 1.0);
        let s = song("Y", 0.0, 0.0, 0.0);
        assert!(approx(score(&s, &p), 0.0));
    }

    #[test]
    fn test_artist_match_adds_exactly_ten() {
        let with = profile(&["X"], 0.6, 0.6, 0.6);
        let without = profile(&[], 0.6, 0.6, 0.6);
        let s = song("X", 0.3, 0.9, 0.5);
        assert!(approx(score(&s, &with) - score(&s, &without), 10.0));
    }

    #[test]
    fn test_missing_features_count_as_zero() {
        let p = profile(&[], 0.5, 0.5, 0.5);
        let s = CandidateSong::new("untagged", "Y");
        // 5 * 0.5 + 5 * 0.5 + 3 * 0.5
        assert!(approx(score(&s, &p), 6.5));
    }

    #[test]
    fn test_qualifies_by_artist_only() {
        let p = profile(&["X"], 0.1, 0.1, 0.1);
        assert!(qualifies(&song("X", 0.9, 0.9, 0.9), &p));
        assert!(!qualifies(&song("Y", 0.9, 0.9, 0.9), &p));
    }

    #[test]
    fn test_qualifies_requires_energy_and_danceability_together() {
        let p = profile(&[], 0.5, 0.5, 0.0);
        assert!(qualifies(&song("Y", 0.7, 0.3, 1.0), &p));
        assert!(!qualifies(&song("Y", 0.7, 0.9, 1.0), &p));
    }

    #[test]
    fn test_qualifies_by_valence_alone() {
        let p = profile(&[], 0.0, 0.0, 0.5);
        assert!(qualifies(&song("Y", 1.0, 1.0, 0.75), &p));
    }

    #[test]
    fn test_within_tolerance_band() {
        let p = profile(&[], 0.5, 0.5, 0.0);
        assert!(qualifies(&song("Y", 0.75, 0.25, 1.0), &p));
    }

    #[test]
    fn test_rank_sorts_descending_and_limits() {
        let p = profile(&["X"], 0.5, 0.5, 0.5);
        let songs: Vec<CandidateSong> = (0..30)
            .map(|i| song("Y", 0.5, 0.5, 0.3 + i as f64 * 0.005))
            .chain(std::iter::once(song("X", 0.0, 0.0, 0.0)))
            .collect();

        let ranked = rank(&songs, &p, SCORED_LIMIT);
        assert_eq!(ranked.len(), SCORED_LIMIT);
        assert_eq!(ranked[0].song.artist, "X");
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rank_ties_keep_corpus_order() {
        let p = profile(&[], 0.5, 0.5, 0.5);
        let songs: Vec<CandidateSong> = (0..5).map(|_| song("Y", 0.5, 0.5, 0.5)).collect();

        let ranked = rank(&songs, &p, SCORED_LIMIT);
        let ids: Vec<_> = ranked.iter().map(|s| s.song.id).collect();
        let expected: Vec<_> = songs.iter().map(|s| s.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_rank_excludes_non_qualifying() {
        let p = profile(&[], 0.0, 0.0, 0.0);
        let songs = vec![song("Y", 1.0, 1.0, 1.0), song("Z", 0.1, 0.1, 0.9)];
        let ranked = rank(&songs, &p, SCORED_LIMIT);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].song.artist, "Z");
    }
}

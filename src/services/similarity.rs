use crate::models::{AudioFeatures, PreferenceSummary, Recommendation, SimilarityReport};

/// Per-feature means of a recommendation list
///
/// A song lacking a feature contributes 0, and an empty list has all means
/// at 0.
pub fn feature_means(recommendations: &[Recommendation]) -> AudioFeatures {
    if recommendations.is_empty() {
        return AudioFeatures::new(0.0, 0.0, 0.0);
    }

    let n = recommendations.len() as f64;
    let sum = |f: fn(&Recommendation) -> Option<f64>| -> f64 {
        recommendations.iter().map(|r| f(r).unwrap_or(0.0)).sum::<f64>() / n
    };

    AudioFeatures::new(
        sum(|r| r.song.energy),
        sum(|r| r.song.danceability),
        sum(|r| r.song.valence),
    )
}

/// Compares a profile's feature averages with what was recommended
///
/// The score is not clamped: out-of-range features upstream can push it
/// outside [0, 100].
pub fn similarity(profile: &PreferenceSummary, recommendations: &[Recommendation]) -> SimilarityReport {
    let wanted = AudioFeatures::from(profile);
    let got = feature_means(recommendations);

    let distance = wanted.distance(&got);
    let raw = (1.0 - distance / 3f64.sqrt()) * 100.0;

    SimilarityReport {
        similarity_score: (raw * 10.0).round() / 10.0,
        energy_delta: (wanted.energy - got.energy).abs(),
        danceability_delta: (wanted.danceability - got.danceability).abs(),
        valence_delta: (wanted.valence - got.valence).abs(),
        profile_features: wanted,
        recommendation_features: got,
    }
}

/// PostgreSQL-backed candidate corpus
///
/// Scoring runs entirely inside the database: one statement filters by the
/// selection rule, computes the score, sorts and limits. Only the top rows
/// cross the wire. Missing features are read as 0 through `COALESCE`.
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::catalog::CandidateStore,
    error::AppResult,
    models::{CandidateSong, PreferenceProfile, ScoredCandidate, SongId},
    services::scoring::{
        ARTIST_WEIGHT, DANCEABILITY_WEIGHT, ENERGY_WEIGHT, FEATURE_TOLERANCE, VALENCE_WEIGHT,
    },
};

const SCORED_QUERY: &str = r#"
    SELECT id, track, artist, album, energy, danceability, valence, score
    FROM (
        SELECT *,
            (CASE WHEN artist = ANY($1) THEN $6 ELSE 0 END)
            + $7 * (1 - ABS(COALESCE(energy, 0) - $2))
            + $8 * (1 - ABS(COALESCE(danceability, 0) - $3))
            + $9 * (1 - ABS(COALESCE(valence, 0) - $4)) AS score
        FROM songs
        WHERE artist = ANY($1)
           OR (ABS(COALESCE(energy, 0) - $2) <= $10
               AND ABS(COALESCE(danceability, 0) - $3) <= $10)
           OR ABS(COALESCE(valence, 0) - $4) <= $10
    ) AS scored
    ORDER BY score DESC, seq ASC
    LIMIT $5
"#;

#[derive(Debug, sqlx::FromRow)]
struct ScoredRow {
    #[sqlx(flatten)]
    song: CandidateSong,
    score: f64,
}

#[derive(Clone)]
pub struct PgCandidateStore {
    db_pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Inserts songs in slice order, skipping ids already present
    ///
    /// Runs in one transaction so `seq` follows slice order. Returns the
    /// number of rows actually inserted.
    pub async fn seed(&self, songs: &[CandidateSong]) -> AppResult<u64> {
        let mut tx = self.db_pool.begin().await?;
        let mut inserted = 0u64;

        for song in songs {
            let result = sqlx::query(
                r#"
                INSERT INTO songs (id, track, artist, album, energy, danceability, valence)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(song.id.0)
            .bind(&song.track)
            .bind(&song.artist)
            .bind(&song.album)
            .bind(song.energy)
            .bind(song.danceability)
            .bind(song.valence)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;

        tracing::info!(
            songs = songs.len(),
            inserted,
            skipped = songs.len() as u64 - inserted,
            "Seeded song catalog"
        );

        Ok(inserted)
    }
}

#[async_trait::async_trait]
impl CandidateStore for PgCandidateStore {
    async fn find_by_artists(
        &self,
        artists: &[String],
        limit: usize,
    ) -> AppResult<Vec<CandidateSong>> {
        if artists.is_empty() {
            return Ok(Vec::new());
        }

        let songs = sqlx::query_as::<_, CandidateSong>(
            r#"
            SELECT id, track, artist, album, energy, danceability, valence
            FROM songs
            WHERE artist = ANY($1)
            ORDER BY seq
            LIMIT $2
            "#,
        )
        .bind(artists)
        .bind(limit as i64)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(songs)
    }

    async fn score_candidates(
        &self,
        profile: &PreferenceProfile,
        limit: usize,
    ) -> AppResult<Vec<ScoredCandidate>> {
        let rows = sqlx::query_as::<_, ScoredRow>(SCORED_QUERY)
            .bind(&profile.top_artists)
            .bind(profile.avg_energy)
            .bind(profile.avg_danceability)
            .bind(profile.avg_valence)
            .bind(limit as i64)
            .bind(ARTIST_WEIGHT)
            .bind(ENERGY_WEIGHT)
            .bind(DANCEABILITY_WEIGHT)
            .bind(VALENCE_WEIGHT)
            .bind(FEATURE_TOLERANCE)
            .fetch_all(&self.db_pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ScoredCandidate {
                song: row.song,
                score: row.score,
            })
            .collect())
    }

    async fn sample(&self, size: usize) -> AppResult<Vec<CandidateSong>> {
        let songs = sqlx::query_as::<_, CandidateSong>(
            r#"
            SELECT id, track, artist, album, energy, danceability, valence
            FROM songs
            ORDER BY random()
            LIMIT $1
            "#,
        )
        .bind(size as i64)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(songs)
    }

    async fn sample_excluding(
        &self,
        exclude: &[SongId],
        size: usize,
    ) -> AppResult<Vec<CandidateSong>> {
        let excluded: Vec<Uuid> = exclude.iter().map(|id| id.0).collect();

        let songs = sqlx::query_as::<_, CandidateSong>(
            r#"
            SELECT id, track, artist, album, energy, danceability, valence
            FROM songs
            WHERE NOT (id = ANY($1))
            ORDER BY random()
            LIMIT $2
            "#,
        )
        .bind(&excluded)
        .bind(size as i64)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(songs)
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
            .fetch_one(&self.db_pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    middleware::{AccessToken, RequestId, SessionId},
    models::{RecommendationResult, SimilarityReport},
    services,
};

/// Handler for the recommendations endpoint
///
/// The result is remembered for the caller's session, when one is given, so
/// a follow-up similarity request can analyze it.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Option<SessionId>,
    token: AccessToken,
) -> AppResult<Json<RecommendationResult>> {
    tracing::info!(
        request_id = %request_id,
        has_session = session.is_some(),
        "Processing recommendation request"
    );

    let result = state.assembler.assemble(&token.0).await?;

    if let Some(session) = session {
        if let Err(e) = state.sessions.save(session.as_str(), &result).await {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to store session result");
        }
    }

    tracing::info!(
        request_id = %request_id,
        recommendations = result.recommendations.len(),
        "Recommendations generated"
    );

    Ok(Json(result))
}

/// Handler for the similarity endpoint
///
/// Analyzes the session's most recent recommendation result.
pub async fn similarity(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: SessionId,
) -> AppResult<Json<SimilarityReport>> {
    let stored = state.sessions.load(session.as_str()).await?.ok_or_else(|| {
        AppError::NotFound("No recommendations for this session yet".to_string())
    })?;

    let report = services::similarity(&stored.user_preferences, &stored.recommendations);

    tracing::info!(
        request_id = %request_id,
        similarity = report.similarity_score,
        "Similarity computed"
    );

    Ok(Json(report))
}

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    api::AppState, error::AppResult, middleware::AccessToken, models::ListeningHistoryItem,
    services::top_tracks,
};

/// Handler for the top tracks endpoint
pub async fn top_tracks(
    State(state): State<Arc<AppState>>,
    token: AccessToken,
) -> AppResult<Json<Vec<ListeningHistoryItem>>> {
    let tracks = top_tracks::top_tracks(state.history_provider.clone(), &token.0).await?;
    Ok(Json(tracks))
}

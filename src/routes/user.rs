use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{api::AppState, error::AppResult, middleware::AccessToken, models::ListenerProfile};

/// Handler for the current user endpoint
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    token: AccessToken,
) -> AppResult<Json<ListenerProfile>> {
    let profile = state.history_provider.current_user(&token.0).await?;
    Ok(Json(profile))
}

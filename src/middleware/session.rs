use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;

/// Header carrying the caller's session identity
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Provider access token taken from `Authorization: Bearer <token>`
///
/// The OAuth exchange happens upstream; this only reads the result.
#[derive(Clone)]
pub struct AccessToken(pub String);

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AccessToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| AccessToken(token.to_string()))
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))
    }
}

/// Session identity from the `x-session-id` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(SESSION_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| SessionId(id.to_string()))
            .ok_or_else(|| AppError::InvalidInput(format!("Missing {} header", SESSION_ID_HEADER)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract<T: FromRequestParts<(), Rejection = AppError>>(
        request: Request<()>,
    ) -> Result<T, AppError> {
        let (mut parts, _) = request.into_parts();
        T::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_bearer_token_extracted() {
        let request = Request::builder()
            .header(AUTHORIZATION, "Bearer abc123")
            .body(())
            .unwrap();

        let token: AccessToken = extract(request).await.unwrap();
        assert_eq!(token.0, "abc123");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        let result: Result<AccessToken, _> = extract(request).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_unauthorized() {
        let request = Request::builder()
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap();
        let result: Result<AccessToken, _> = extract(request).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_session_id_extracted() {
        let request = Request::builder()
            .header(SESSION_ID_HEADER, "session-42")
            .body(())
            .unwrap();

        let session: SessionId = extract(request).await.unwrap();
        assert_eq!(session.as_str(), "session-42");
    }
}

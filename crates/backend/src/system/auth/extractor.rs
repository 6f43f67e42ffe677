use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use contracts::system::auth::TokenClaims;

/// Extractor for getting current user from JWT token.
/// Usage in handlers: `async fn handler(CurrentUser(claims): CurrentUser) -> Response`
///
/// Берёт claims из extensions (если запрос прошёл через middleware)
/// или валидирует Bearer-токен сам — для маршрутов, где методы с
/// разными требованиями к ролям делят один путь.
///
/// Отсутствующий или невалидный токен отклоняется как 403.
pub struct CurrentUser(pub TokenClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<TokenClaims>() {
            return Ok(CurrentUser(claims.clone()));
        }

        let token = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(StatusCode::FORBIDDEN)?;

        let claims = super::jwt::validate_token(token)
            .await
            .map_err(|_| StatusCode::FORBIDDEN)?;
        Ok(CurrentUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn missing_or_malformed_bearer_token_is_forbidden() {
        let (mut parts, _) = Request::builder()
            .uri("/api/v1/reviews")
            .body(())
            .unwrap()
            .into_parts();
        let rejected = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert_eq!(rejected.err(), Some(StatusCode::FORBIDDEN));

        let (mut parts, _) = Request::builder()
            .uri("/api/v1/reviews")
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap()
            .into_parts();
        let rejected = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert_eq!(rejected.err(), Some(StatusCode::FORBIDDEN));
    }
}

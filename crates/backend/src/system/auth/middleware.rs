use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Middleware that requires valid JWT authentication.
/// Запрос без валидного токена отклоняется как 403.
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let token = bearer_token(&req).ok_or(StatusCode::FORBIDDEN)?;

    let claims = super::jwt::validate_token(token)
        .await
        .map_err(|_| StatusCode::FORBIDDEN)?;

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that requires the Admin role
pub async fn require_admin(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let token = bearer_token(&req).ok_or(StatusCode::FORBIDDEN)?;

    let claims = super::jwt::validate_token(token)
        .await
        .map_err(|_| StatusCode::FORBIDDEN)?;

    if !claims.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

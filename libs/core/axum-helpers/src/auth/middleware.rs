use crate::errors::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Authenticated caller, inserted into request extensions by
/// [`jwt_auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Resolves a bearer token to the user it was issued for.
#[async_trait]
pub trait TokenAuthenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<CurrentUser, AppError>;
}

pub type SharedAuthenticator = Arc<dyn TokenAuthenticator>;

/// Reads `Authorization: Bearer <token>`, falling back to the
/// `access_token` cookie.
pub fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == "access_token" && !value.is_empty()).then(|| value.to_string())
                    })
                })
        })
}

/// Rejects the request with 401 unless it carries a token the
/// authenticator accepts.
///
/// ```ignore
/// let protected = Router::new()
///     .route("/products", post(create_product))
///     .route_layer(axum::middleware::from_fn_with_state(
///         authenticator.clone(),
///         jwt_auth_middleware,
///     ));
/// ```
pub async fn jwt_auth_middleware(
    State(authenticator): State<SharedAuthenticator>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token_from_request(&headers) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return Err(AppError::Unauthorized("No token provided".to_string()));
    };

    let user = authenticator.authenticate(&token).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{HeaderValue, Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use tower::ServiceExt;

    struct StaticAuthenticator;

    #[async_trait]
    impl TokenAuthenticator for StaticAuthenticator {
        async fn authenticate(&self, token: &str) -> Result<CurrentUser, AppError> {
            if token == "good" {
                Ok(CurrentUser {
                    id: Uuid::nil(),
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                })
            } else {
                Err(AppError::Unauthorized("Invalid token".to_string()))
            }
        }
    }

    fn app() -> Router {
        let authenticator: SharedAuthenticator = Arc::new(StaticAuthenticator);
        Router::new()
            .route("/me", get(|user: CurrentUser| async move { user.name }))
            .route_layer(from_fn_with_state(authenticator, jwt_auth_middleware))
    }

    async fn status_for(request: Request<Body>) -> StatusCode {
        app().oneshot(request).await.unwrap().status()
    }

    #[test]
    fn test_extract_token_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("access_token=xyz"));
        assert_eq!(extract_token_from_request(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=xyz"),
        );
        assert_eq!(extract_token_from_request(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_extract_token_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_token_from_request(&headers), None);
    }

    #[tokio::test]
    async fn test_middleware_accepts_valid_token() {
        let request = Request::builder()
            .uri("/me")
            .header(header::AUTHORIZATION, "Bearer good")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_for(request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_rejects_bad_or_missing_token() {
        let bad = Request::builder()
            .uri("/me")
            .header(header::AUTHORIZATION, "Bearer bad")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_for(bad).await, StatusCode::UNAUTHORIZED);

        let missing = Request::builder().uri("/me").body(Body::empty()).unwrap();
        assert_eq!(status_for(missing).await, StatusCode::UNAUTHORIZED);
    }
}

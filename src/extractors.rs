//! Request binding with 400 JSON errors instead of axum's plain-text rejections.

use axum::{
    Form, Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts},
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{ListUsersQuery, UserRequest},
};

/// `?limit=..&offset=..` for the list endpoint.
pub struct ListParams(pub ListUsersQuery);

impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<ListUsersQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        Ok(Self(query))
    }
}

/// User id from the `{id}` path segment.
pub struct UserId(pub Uuid);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::validation("missing user id"))?;

        let id = Uuid::parse_str(&raw)
            .map_err(|_| ApiError::validation(format!("invalid user id: {raw:?}")))?;
        Ok(Self(id))
    }
}

/// `name` and `dateOfBirth`, read from a JSON body, a form body or the query
/// string, in that order of preference by content type.
pub struct UserInput(pub UserRequest);

impl<S> FromRequest<S> for UserInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let input = if content_type.starts_with("application/json") {
            let Json(input) = Json::<UserRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation(e.body_text()))?;
            input
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(input) = Form::<UserRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation(e.body_text()))?;
            input
        } else {
            let Query(input) = Query::<UserRequest>::try_from_uri(req.uri())
                .map_err(|e| ApiError::validation(e.body_text()))?;
            input
        };

        Ok(Self(input))
    }
}

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::ApiError,
    extractors::{ListParams, UserId, UserInput},
    models::ResponseUser,
    state::AppState,
};

pub async fn get_users(
    State(state): State<AppState>,
    ListParams(query): ListParams,
) -> Result<Json<Vec<ResponseUser>>, ApiError> {
    let users = state.users.list(query.limit, query.offset).await?;

    Ok(Json(users.into_iter().map(ResponseUser::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<ResponseUser>, ApiError> {
    let user = state.users.get(id).await?;

    Ok(Json(user.into()))
}

pub async fn add_user(
    State(state): State<AppState>,
    UserInput(body): UserInput,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.create(body.name, body.date_of_birth).await?;
    state.metrics.users_created.add(1, &[]);

    Ok((StatusCode::CREATED, Json(ResponseUser::from(user))))
}

pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    UserInput(body): UserInput,
) -> Result<Json<ResponseUser>, ApiError> {
    let user = state.users.update(id, body.name, body.date_of_birth).await?;
    state.metrics.users_updated.add(1, &[]);

    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<StatusCode, ApiError> {
    state.users.delete(id).await?;
    state.metrics.users_deleted.add(1, &[]);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.users.database().ping().await?;

    Ok(Json(json!({ "status": "ok" })))
}

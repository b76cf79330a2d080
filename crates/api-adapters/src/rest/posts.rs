use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{Post, PostUpdate, PostWithComments};
use serde::Deserialize;
use services::validation;

use crate::error::ApiError;
use crate::extract::{ApiJson, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub perex: String,
    #[serde(default)]
    pub content: String,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PostWithComments>>, ApiError> {
    Ok(Json(state.posts.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostWithComments>, ApiError> {
    let id = validation::parse_id("post", &id)?;
    Ok(Json(state.posts.get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(author): AuthUser,
    ApiJson(body): ApiJson<CreatePost>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state
        .posts
        .create(&author, &body.title, &body.perex, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(requester): AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<PostUpdate>,
) -> Result<Json<Post>, ApiError> {
    let id = validation::parse_id("post", &id)?;
    Ok(Json(state.posts.update(&requester, id, body).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(requester): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = validation::parse_id("post", &id)?;
    state.posts.delete(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{Comment, VoteDirection};
use serde::Deserialize;
use services::validation;

use crate::error::ApiError;
use crate::extract::{ApiJson, AuthUser, ClientIp};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub post_id: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct UpdateComment {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
    #[serde(rename = "type", default)]
    pub kind: String,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(state.comments.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Comment>, ApiError> {
    let id = validation::parse_id("comment", &id)?;
    Ok(Json(state.comments.get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(author): AuthUser,
    ApiJson(body): ApiJson<CreateComment>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    // Clients send the post id either as a number or as a numeric string.
    let raw = match &body.post_id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let post_id = validation::parse_id("post", &raw)?;
    let comment = state.comments.create(&author, post_id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(requester): AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateComment>,
) -> Result<Json<Comment>, ApiError> {
    let id = validation::parse_id("comment", &id)?;
    Ok(Json(state.comments.update(&requester, id, &body.content).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(requester): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = validation::parse_id("comment", &id)?;
    state.comments.delete(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The voter is the peer IP, not the authenticated user. Subscription
/// events are published by the GraphQL mutations only.
pub async fn vote(
    State(state): State<AppState>,
    _caller: AuthUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<VoteBody>,
) -> Result<Json<Comment>, ApiError> {
    let id = validation::parse_id("comment", &id)?;
    let direction: VoteDirection = body.kind.parse()?;

    let outcome = state.votes.apply(id, direction, &ip.to_string()).await;
    state.metrics.record_vote(&outcome);
    Ok(Json(outcome?.comment))
}

//! JSON REST routes, mounted under `/api`.

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub mod comments;
pub mod health;
pub mod posts;
pub mod users;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/posts", get(posts::list).post(posts::create))
        .route("/posts/{id}", get(posts::get).put(posts::update).delete(posts::delete))
        .route("/comments", get(comments::list).post(comments::create))
        .route(
            "/comments/{id}",
            get(comments::get).put(comments::update).delete(comments::delete),
        )
        .route("/comments/{id}/vote", post(comments::vote))
}

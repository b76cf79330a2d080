//! Output and input types. Relations resolve lazily through the services.

use async_graphql::{Context, InputObject, Object, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use domains::{Comment, Post, PostUpdate, User};

use super::app_state;
use super::errors::to_gql;

pub struct UserObject(pub User);

#[Object(name = "User")]
impl UserObject {
    async fn id(&self) -> ID {
        ID::from(self.0.id)
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<PostObject>> {
        let posts = app_state(ctx)?.posts.list_by_author(self.0.id).await.map_err(to_gql)?;
        Ok(posts.into_iter().map(PostObject).collect())
    }

    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<CommentObject>> {
        let comments = app_state(ctx)?.comments.list_by_author(self.0.id).await.map_err(to_gql)?;
        Ok(comments.into_iter().map(CommentObject).collect())
    }
}

pub struct PostObject(pub Post);

#[Object(name = "Post")]
impl PostObject {
    async fn id(&self) -> ID {
        ID::from(self.0.id)
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn perex(&self) -> &str {
        &self.0.perex
    }

    async fn content(&self) -> &str {
        &self.0.content
    }

    async fn author_id(&self) -> ID {
        ID::from(self.0.author_id)
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<UserObject> {
        let user = app_state(ctx)?.users.get(self.0.author_id).await.map_err(to_gql)?;
        Ok(UserObject(user))
    }

    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<CommentObject>> {
        let comments = app_state(ctx)?.comments.list_by_post(self.0.id).await.map_err(to_gql)?;
        Ok(comments.into_iter().map(CommentObject).collect())
    }
}

pub struct CommentObject(pub Comment);

#[Object(name = "Comment")]
impl CommentObject {
    async fn id(&self) -> ID {
        ID::from(self.0.id)
    }

    async fn content(&self) -> &str {
        &self.0.content
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    /// Net of all votes cast on this comment.
    async fn score(&self) -> i32 {
        self.0.score
    }

    async fn post_id(&self) -> ID {
        ID::from(self.0.post_id)
    }

    async fn author_id(&self) -> ID {
        ID::from(self.0.author_id)
    }

    async fn post(&self, ctx: &Context<'_>) -> Result<PostObject> {
        let post = app_state(ctx)?.posts.find(self.0.post_id).await.map_err(to_gql)?;
        Ok(PostObject(post))
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<UserObject> {
        let user = app_state(ctx)?.users.get(self.0.author_id).await.map_err(to_gql)?;
        Ok(UserObject(user))
    }
}

#[derive(SimpleObject)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserObject,
}

#[derive(InputObject, Default)]
pub struct PostUpdateInput {
    pub title: Option<String>,
    pub perex: Option<String>,
    pub content: Option<String>,
}

impl From<PostUpdateInput> for PostUpdate {
    fn from(input: PostUpdateInput) -> Self {
        PostUpdate { title: input.title, perex: input.perex, content: input.content }
    }
}

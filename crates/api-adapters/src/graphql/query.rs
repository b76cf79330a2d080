use async_graphql::{Context, Object, Result, ID};

use super::errors::to_gql;
use super::types::{CommentObject, PostObject, UserObject};
use super::{app_state, parse_id};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<UserObject>> {
        let users = app_state(ctx)?.users.list().await.map_err(to_gql)?;
        Ok(users.into_iter().map(UserObject).collect())
    }

    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<UserObject> {
        let id = parse_id("user", &id)?;
        let user = app_state(ctx)?.users.get(id).await.map_err(to_gql)?;
        Ok(UserObject(user))
    }

    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<PostObject>> {
        let posts = app_state(ctx)?.posts.list_posts().await.map_err(to_gql)?;
        Ok(posts.into_iter().map(PostObject).collect())
    }

    async fn post(&self, ctx: &Context<'_>, id: ID) -> Result<PostObject> {
        let id = parse_id("post", &id)?;
        let post = app_state(ctx)?.posts.find(id).await.map_err(to_gql)?;
        Ok(PostObject(post))
    }

    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<CommentObject>> {
        let comments = app_state(ctx)?.comments.list().await.map_err(to_gql)?;
        Ok(comments.into_iter().map(CommentObject).collect())
    }

    async fn comment(&self, ctx: &Context<'_>, id: ID) -> Result<CommentObject> {
        let id = parse_id("comment", &id)?;
        let comment = app_state(ctx)?.comments.get(id).await.map_err(to_gql)?;
        Ok(CommentObject(comment))
    }
}

use async_graphql::{Context, Object, Result, ID};
use domains::{CommentEvent, EventPublisher, VoteChange, VoteDirection};

use super::errors::to_gql;
use super::types::{AuthPayload, CommentObject, PostObject, PostUpdateInput, UserObject};
use super::{app_state, parse_id, require_identity, VoterIp};

const FALLBACK_VOTER: &str = "127.0.0.1";

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_user(&self, ctx: &Context<'_>, username: String, password: String) -> Result<AuthPayload> {
        let users = &app_state(ctx)?.users;
        users.register(&username, &password).await.map_err(to_gql)?;
        let (token, user) = users.login(&username, &password).await.map_err(to_gql)?;
        Ok(AuthPayload { token, user: UserObject(user) })
    }

    async fn login_user(&self, ctx: &Context<'_>, username: String, password: String) -> Result<AuthPayload> {
        let (token, user) = app_state(ctx)?.users.login(&username, &password).await.map_err(to_gql)?;
        Ok(AuthPayload { token, user: UserObject(user) })
    }

    async fn create_post(
        &self,
        ctx: &Context<'_>,
        title: String,
        perex: String,
        content: String,
    ) -> Result<PostObject> {
        let author = require_identity(ctx)?;
        let post = app_state(ctx)?
            .posts
            .create(&author, &title, &perex, &content)
            .await
            .map_err(to_gql)?;
        Ok(PostObject(post))
    }

    async fn update_post(&self, ctx: &Context<'_>, post_id: ID, data: PostUpdateInput) -> Result<PostObject> {
        let requester = require_identity(ctx)?;
        let id = parse_id("post", &post_id)?;
        let post = app_state(ctx)?
            .posts
            .update(&requester, id, data.into())
            .await
            .map_err(to_gql)?;
        Ok(PostObject(post))
    }

    async fn delete_post(&self, ctx: &Context<'_>, post_id: ID) -> Result<PostObject> {
        let requester = require_identity(ctx)?;
        let id = parse_id("post", &post_id)?;
        let post = app_state(ctx)?.posts.delete(&requester, id).await.map_err(to_gql)?;
        Ok(PostObject(post))
    }

    async fn create_comment(&self, ctx: &Context<'_>, post_id: ID, content: String) -> Result<CommentObject> {
        let author = require_identity(ctx)?;
        let post_id = parse_id("post", &post_id)?;
        let state = app_state(ctx)?;
        let comment = state.comments.create(&author, post_id, &content).await.map_err(to_gql)?;
        state.events.publish(CommentEvent::Added(comment.clone()));
        Ok(CommentObject(comment))
    }

    async fn update_comment(&self, ctx: &Context<'_>, comment_id: ID, content: String) -> Result<CommentObject> {
        let requester = require_identity(ctx)?;
        let id = parse_id("comment", &comment_id)?;
        let state = app_state(ctx)?;
        let comment = state.comments.update(&requester, id, &content).await.map_err(to_gql)?;
        state.events.publish(CommentEvent::Updated(comment.clone()));
        Ok(CommentObject(comment))
    }

    async fn delete_comment(&self, ctx: &Context<'_>, comment_id: ID) -> Result<CommentObject> {
        let requester = require_identity(ctx)?;
        let id = parse_id("comment", &comment_id)?;
        let state = app_state(ctx)?;
        let comment = state.comments.delete(&requester, id).await.map_err(to_gql)?;
        state.events.publish(CommentEvent::Deleted(comment.clone()));
        Ok(CommentObject(comment))
    }

    /// Casts or flips the caller's vote. The voter is the request's peer IP;
    /// no login is required.
    async fn vote_comment(
        &self,
        ctx: &Context<'_>,
        comment_id: ID,
        #[graphql(name = "type")] direction: String,
    ) -> Result<CommentObject> {
        let id = parse_id("comment", &comment_id)?;
        let direction: VoteDirection = direction.parse().map_err(to_gql)?;
        let voter = ctx
            .data_opt::<VoterIp>()
            .map(|v| v.0.as_str())
            .unwrap_or(FALLBACK_VOTER);

        let state = app_state(ctx)?;
        let outcome = state.votes.apply(id, direction, voter).await;
        state.metrics.record_vote(&outcome);
        let outcome = outcome.map_err(to_gql)?;

        if outcome.change == VoteChange::Revised {
            state.events.publish(CommentEvent::VoteUpdated(outcome.comment.clone()));
        }
        Ok(CommentObject(outcome.comment))
    }
}

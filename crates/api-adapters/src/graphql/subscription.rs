use async_graphql::{Context, Result, Subscription, ID};
use domains::CommentEvent;
use futures_util::{Stream, StreamExt};

use super::types::CommentObject;
use super::{app_state, parse_id};

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// New comments on one post.
    async fn comment_added(&self, ctx: &Context<'_>, post_id: ID) -> Result<impl Stream<Item = CommentObject>> {
        let post_id = parse_id("post", &post_id)?;
        let stream = app_state(ctx)?.events.comments(move |event| match event {
            CommentEvent::Added(c) if c.post_id == post_id => Some(c),
            _ => None,
        });
        Ok(stream.map(CommentObject))
    }

    async fn update_comment(&self, ctx: &Context<'_>, comment_id: ID) -> Result<impl Stream<Item = CommentObject>> {
        let id = parse_id("comment", &comment_id)?;
        let stream = app_state(ctx)?.events.comments(move |event| match event {
            CommentEvent::Updated(c) if c.id == id => Some(c),
            _ => None,
        });
        Ok(stream.map(CommentObject))
    }

    async fn delete_comment(&self, ctx: &Context<'_>, comment_id: ID) -> Result<impl Stream<Item = CommentObject>> {
        let id = parse_id("comment", &comment_id)?;
        let stream = app_state(ctx)?.events.comments(move |event| match event {
            CommentEvent::Deleted(c) if c.id == id => Some(c),
            _ => None,
        });
        Ok(stream.map(CommentObject))
    }

    /// Score changes caused by a flipped vote.
    async fn vote_updated(&self, ctx: &Context<'_>, comment_id: ID) -> Result<impl Stream<Item = CommentObject>> {
        let id = parse_id("comment", &comment_id)?;
        let stream = app_state(ctx)?.events.comments(move |event| match event {
            CommentEvent::VoteUpdated(c) if c.id == id => Some(c),
            _ => None,
        });
        Ok(stream.map(CommentObject))
    }
}

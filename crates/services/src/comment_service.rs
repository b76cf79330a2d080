use std::sync::Arc;

use domains::{
    Comment, CommentRepository, DomainError, Identity, NewComment, PostRepository, Result,
};
use tracing::info;

use crate::post_service::ensure_author;
use crate::validation;

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    pub async fn list(&self) -> Result<Vec<Comment>> {
        self.comments.list().await
    }

    pub async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.comments.list_by_post(post_id).await
    }

    pub async fn list_by_author(&self, author_id: i64) -> Result<Vec<Comment>> {
        self.comments.list_by_author(author_id).await
    }

    pub async fn get(&self, id: i64) -> Result<Comment> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or(DomainError::CommentNotFound(id))
    }

    pub async fn create(&self, author: &Identity, post_id: i64, content: &str) -> Result<Comment> {
        let content = validation::comment_content(content)?;
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::not_found("Post", post_id));
        }
        let comment = self
            .comments
            .create(NewComment { content, post_id, author_id: author.user_id })
            .await?;
        info!(comment_id = comment.id, post_id, "comment created");
        Ok(comment)
    }

    /// Replaces the content. Only the author may edit; the score is untouched.
    pub async fn update(&self, requester: &Identity, id: i64, content: &str) -> Result<Comment> {
        let content = validation::comment_content(content)?;
        let comment = self.get(id).await?;
        ensure_author(requester, comment.author_id, "edit this comment")?;
        self.comments.update_content(id, &content).await
    }

    pub async fn delete(&self, requester: &Identity, id: i64) -> Result<Comment> {
        let comment = self.get(id).await?;
        ensure_author(requester, comment.author_id, "delete this comment")?;
        let deleted = self.comments.delete(id).await?;
        info!(comment_id = id, "comment deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{MockCommentRepository, MockPostRepository};
    use mockall::predicate::eq;

    fn identity(user_id: i64) -> Identity {
        Identity { user_id, username: format!("user{user_id}") }
    }

    fn comment(id: i64, author_id: i64, score: i32) -> Comment {
        Comment { id, content: "Great post!".into(), created_at: Utc::now(), author_id, post_id: 1, score }
    }

    #[tokio::test]
    async fn create_requires_existing_post() {
        let mut posts = MockPostRepository::new();
        posts.expect_find_by_id().with(eq(7)).returning(|_| Ok(None));
        let mut comments = MockCommentRepository::new();
        comments.expect_create().never();

        let svc = CommentService::new(Arc::new(comments), Arc::new(posts));
        let err = svc.create(&identity(1), 7, "Great post!").await.unwrap_err();
        assert_eq!(err, DomainError::not_found("Post", 7));
    }

    #[tokio::test]
    async fn update_keeps_score_and_checks_author() {
        let mut comments = MockCommentRepository::new();
        comments.expect_find_by_id().returning(|id| Ok(Some(comment(id, 2, 4))));
        comments
            .expect_update_content()
            .with(eq(3), eq("Edited text"))
            .times(1)
            .returning(|id, content| Ok(Comment { content: content.to_string(), ..comment(id, 2, 4) }));

        let svc = CommentService::new(Arc::new(comments), Arc::new(MockPostRepository::new()));
        assert!(matches!(
            svc.update(&identity(1), 3, "Edited text").await,
            Err(DomainError::Forbidden(_))
        ));
        let updated = svc.update(&identity(2), 3, " Edited text ").await.unwrap();
        assert_eq!(updated.content, "Edited text");
        assert_eq!(updated.score, 4);
    }

    #[tokio::test]
    async fn short_content_is_rejected() {
        let svc = CommentService::new(
            Arc::new(MockCommentRepository::new()),
            Arc::new(MockPostRepository::new()),
        );
        assert!(matches!(svc.create(&identity(1), 1, "ok").await, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn get_reports_comment_not_found() {
        let mut comments = MockCommentRepository::new();
        comments.expect_find_by_id().returning(|_| Ok(None));

        let svc = CommentService::new(Arc::new(comments), Arc::new(MockPostRepository::new()));
        assert_eq!(svc.get(12).await.unwrap_err(), DomainError::CommentNotFound(12));
    }
}

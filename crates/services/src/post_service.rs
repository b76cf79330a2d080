use std::collections::HashMap;
use std::sync::Arc;

use domains::{
    Comment, CommentRepository, DomainError, Identity, NewPost, Post, PostRepository, PostUpdate,
    PostWithComments, Result,
};
use tracing::info;

use crate::validation;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    /// All posts, each with its comments.
    pub async fn list(&self) -> Result<Vec<PostWithComments>> {
        let posts = self.posts.list().await?;
        let mut by_post: HashMap<i64, Vec<Comment>> = HashMap::new();
        for comment in self.comments.list().await? {
            by_post.entry(comment.post_id).or_default().push(comment);
        }
        Ok(posts
            .into_iter()
            .map(|post| {
                let comments = by_post.remove(&post.id).unwrap_or_default();
                PostWithComments { post, comments }
            })
            .collect())
    }

    /// All posts, without their comments.
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        self.posts.list().await
    }

    pub async fn get(&self, id: i64) -> Result<PostWithComments> {
        let post = self.find(id).await?;
        let comments = self.comments.list_by_post(id).await?;
        Ok(PostWithComments { post, comments })
    }

    pub async fn find(&self, id: i64) -> Result<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("Post", id))
    }

    pub async fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>> {
        self.posts.list_by_author(author_id).await
    }

    pub async fn create(&self, author: &Identity, title: &str, perex: &str, content: &str) -> Result<Post> {
        let post = NewPost {
            title: validation::title(title)?,
            perex: validation::perex(perex)?,
            content: validation::post_content(content)?,
            author_id: author.user_id,
        };
        let post = self.posts.create(post).await?;
        info!(post_id = post.id, author_id = post.author_id, "post created");
        Ok(post)
    }

    /// Partial update. Only the author may edit.
    pub async fn update(&self, requester: &Identity, id: i64, update: PostUpdate) -> Result<Post> {
        let update = PostUpdate {
            title: update.title.as_deref().map(validation::title).transpose()?,
            perex: update.perex.as_deref().map(validation::perex).transpose()?,
            content: update.content.as_deref().map(validation::post_content).transpose()?,
        };
        let post = self.find(id).await?;
        ensure_author(requester, post.author_id, "edit this post")?;
        self.posts.update(id, update).await
    }

    /// Removes the post together with its comments and their votes.
    pub async fn delete(&self, requester: &Identity, id: i64) -> Result<Post> {
        let post = self.find(id).await?;
        ensure_author(requester, post.author_id, "delete this post")?;
        let deleted = self.posts.delete(id).await?;
        info!(post_id = id, "post deleted");
        Ok(deleted)
    }
}

pub(crate) fn ensure_author(requester: &Identity, author_id: i64, action: &str) -> Result<()> {
    if requester.user_id != author_id {
        return Err(DomainError::Forbidden(format!("You are not authorized to {action}")));
    }
    Ok(())
}

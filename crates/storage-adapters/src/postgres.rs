//! # PostgreSQL storage
//!
//! This module implements the data mapping between the relational model and
//! the `domains` models. Rows are mapped by hand so the domain crate stays
//! free of `sqlx`.

use async_trait::async_trait;
use domains::{
    Comment, CommentRepository, DomainError, NewComment, NewPost, Post, PostRepository,
    PostUpdate, Result, User, UserRepository, Vote, VoteLedger,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{error, info};

const USER_COLUMNS: &str = "id, username, password, created_at";
const POST_COLUMNS: &str = "id, title, perex, content, author_id, created_at";
const COMMENT_COLUMNS: &str = "id, content, created_at, author_id, post_id, score";
const VOTE_COLUMNS: &str = "id, ip, comment_id, value, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(db_error)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the embedded migrations in `migrations/`.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(DomainError::internal)?;
        info!("database migrations applied");
        Ok(())
    }
}

fn db_error(err: sqlx::Error) -> DomainError {
    error!(error = %err, "database error");
    DomainError::internal(err)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

fn user_from_row(row: &PgRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password")?,
        created_at: row.try_get("created_at")?,
    })
}

fn post_from_row(row: &PgRow) -> std::result::Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        perex: row.try_get("perex")?,
        content: row.try_get("content")?,
        author_id: row.try_get("author_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> std::result::Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        author_id: row.try_get("author_id")?,
        post_id: row.try_get("post_id")?,
        score: row.try_get("score")?,
    })
}

fn vote_from_row(row: &PgRow) -> std::result::Result<Vote, sqlx::Error> {
    Ok(Vote {
        id: row.try_get("id")?,
        ip: row.try_get("ip")?,
        comment_id: row.try_get("comment_id")?,
        value: row.try_get("value")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_rows<T>(
    rows: Vec<PgRow>,
    f: fn(&PgRow) -> std::result::Result<T, sqlx::Error>,
) -> Result<Vec<T>> {
    rows.iter().map(|row| f(row).map_err(db_error)).collect()
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(user_from_row).transpose().map_err(db_error)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(user_from_row).transpose().map_err(db_error)
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        map_rows(rows, user_from_row)
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (username, password) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                DomainError::Conflict(format!("username {username} is already taken"))
            } else {
                db_error(err)
            }
        })?;
        user_from_row(&row).map_err(db_error)
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(post_from_row).transpose().map_err(db_error)
    }

    async fn list(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        map_rows(rows, post_from_row)
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = $1 ORDER BY id"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        map_rows(rows, post_from_row)
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        let row = sqlx::query(&format!(
            "INSERT INTO posts (title, perex, content, author_id) VALUES ($1, $2, $3, $4) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(&post.title)
        .bind(&post.perex)
        .bind(&post.content)
        .bind(post.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                DomainError::not_found("User", post.author_id)
            } else {
                db_error(err)
            }
        })?;
        post_from_row(&row).map_err(db_error)
    }

    async fn update(&self, id: i64, update: PostUpdate) -> Result<Post> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET title = COALESCE($2, title), perex = COALESCE($3, perex), \
             content = COALESCE($4, content) WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(update.title)
        .bind(update.perex)
        .bind(update.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(DomainError::not_found("Post", id))?;
        post_from_row(&row).map_err(db_error)
    }

    /// Comments and votes go with the post through `ON DELETE CASCADE`.
    async fn delete(&self, id: i64) -> Result<Post> {
        let row = sqlx::query(&format!("DELETE FROM posts WHERE id = $1 RETURNING {POST_COLUMNS}"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(DomainError::not_found("Post", id))?;
        post_from_row(&row).map_err(db_error)
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(comment_from_row).transpose().map_err(db_error)
    }

    async fn list(&self) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM comments ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        map_rows(rows, comment_from_row)
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = $1 ORDER BY id"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        map_rows(rows, comment_from_row)
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE author_id = $1 ORDER BY id"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        map_rows(rows, comment_from_row)
    }

    async fn create(&self, comment: NewComment) -> Result<Comment> {
        let row = sqlx::query(&format!(
            "INSERT INTO comments (content, post_id, author_id) VALUES ($1, $2, $3) \
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(&comment.content)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                DomainError::not_found("Post", comment.post_id)
            } else {
                db_error(err)
            }
        })?;
        comment_from_row(&row).map_err(db_error)
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Comment> {
        let row = sqlx::query(&format!(
            "UPDATE comments SET content = $2 WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(DomainError::CommentNotFound(id))?;
        comment_from_row(&row).map_err(db_error)
    }

    async fn delete(&self, id: i64) -> Result<Comment> {
        let row = sqlx::query(&format!("DELETE FROM comments WHERE id = $1 RETURNING {COMMENT_COLUMNS}"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(DomainError::CommentNotFound(id))?;
        comment_from_row(&row).map_err(db_error)
    }

    async fn increment_score(&self, id: i64, delta: i32) -> Result<Comment> {
        let row = sqlx::query(&format!(
            "UPDATE comments SET score = score + $2 WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(DomainError::CommentNotFound(id))?;
        comment_from_row(&row).map_err(db_error)
    }
}

#[async_trait]
impl VoteLedger for PgStore {
    async fn find_vote(&self, voter_ip: &str, comment_id: i64) -> Result<Option<Vote>> {
        let row = sqlx::query(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE ip = $1 AND comment_id = $2"
        ))
        .bind(voter_ip)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        row.as_ref().map(vote_from_row).transpose().map_err(db_error)
    }

    async fn record_vote(&self, voter_ip: &str, comment_id: i64, value: i32) -> Result<Vote> {
        let row = sqlx::query(&format!(
            "INSERT INTO votes (ip, comment_id, value) VALUES ($1, $2, $3) RETURNING {VOTE_COLUMNS}"
        ))
        .bind(voter_ip)
        .bind(comment_id)
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                DomainError::DuplicateVote
            } else if is_foreign_key_violation(&err) {
                DomainError::CommentNotFound(comment_id)
            } else {
                db_error(err)
            }
        })?;
        vote_from_row(&row).map_err(db_error)
    }

    async fn revise_vote(&self, vote_id: i64, expected: i32, value: i32) -> Result<Vote> {
        let row = sqlx::query(&format!(
            "UPDATE votes SET value = $3 WHERE id = $1 AND value = $2 RETURNING {VOTE_COLUMNS}"
        ))
        .bind(vote_id)
        .bind(expected)
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => vote_from_row(&row).map_err(db_error),
            None => {
                let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM votes WHERE id = $1)")
                    .bind(vote_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(db_error)?;
                if exists {
                    Err(DomainError::AlreadyVoted)
                } else {
                    Err(DomainError::not_found("Vote", vote_id))
                }
            }
        }
    }
}

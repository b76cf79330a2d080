//! Fills an empty database with three users, three posts and a handful of
//! scored comments.
//!
//! Scores are produced by casting votes from synthetic voter addresses, so
//! every seeded score is backed by ledger rows.

use std::sync::Arc;

use anyhow::Context;
use auth_adapters::Argon2Hasher;
use configs::AppConfig;
use domains::{
    CommentRepository, Identity, PasswordHasher, PostRepository, User, UserRepository, VoteDirection,
    VoteLedger,
};
use secrecy::ExposeSecret;
use services::{CommentService, PostService, VoteService};
use storage_adapters::PgStore;
use tracing::info;

const PASSWORD: &str = "password123";

struct SeedPost {
    title: &'static str,
    perex: &'static str,
    content: &'static str,
    author: usize,
    comments: &'static [(&'static str, usize, i32)],
}

const USERNAMES: [&str; 3] = ["john_doe", "jane_doe", "jack_doe"];

const POSTS: &[SeedPost] = &[
    SeedPost {
        title: "First Post",
        perex: "A short summary of the first post.",
        content: "This is the content of the first post.",
        author: 0,
        comments: &[("Great post!", 1, 5), ("Thanks for sharing!", 2, 3)],
    },
    SeedPost {
        title: "Second Post",
        perex: "A short summary of the second post.",
        content: "This is the content of the second post.",
        author: 0,
        comments: &[("Interesting read!", 1, 2)],
    },
    SeedPost {
        title: "Only Post by Jane",
        perex: "A short summary of Jane's post.",
        content: "This is Jane's single post.",
        author: 1,
        comments: &[("Nice post, Jane!", 0, 4)],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = AppConfig::load().context("loading configuration")?;
    let store = PgStore::connect(config.database.url.expose_secret(), config.database.max_connections)
        .await
        .context("connecting to postgres")?;
    store.migrate().await.context("running migrations")?;

    seed(Arc::new(store), &Argon2Hasher::new()).await?;
    info!("database seeded successfully");
    Ok(())
}

async fn seed<S>(store: Arc<S>, hasher: &dyn PasswordHasher) -> anyhow::Result<()>
where
    S: UserRepository + PostRepository + CommentRepository + VoteLedger + 'static,
{
    let posts = PostService::new(store.clone(), store.clone());
    let comments = CommentService::new(store.clone(), store.clone());
    let votes = VoteService::new(store.clone(), store.clone());

    let mut users: Vec<User> = Vec::with_capacity(USERNAMES.len());
    for username in USERNAMES {
        let hash = hasher.hash(PASSWORD)?;
        let user = UserRepository::create(store.as_ref(), username, &hash)
            .await
            .with_context(|| format!("creating user {username}"))?;
        info!(user_id = user.id, username, "user created");
        users.push(user);
    }
    let identity = |index: usize| Identity { user_id: users[index].id, username: users[index].username.clone() };

    for entry in POSTS {
        let post = posts
            .create(&identity(entry.author), entry.title, entry.perex, entry.content)
            .await
            .with_context(|| format!("creating post {:?}", entry.title))?;

        for &(content, author, score) in entry.comments {
            let comment = comments.create(&identity(author), post.id, content).await?;
            for voter in 0..score {
                votes
                    .apply(comment.id, VoteDirection::Upvote, &format!("10.0.0.{}", voter + 1))
                    .await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage_adapters::MemoryStore;

    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> domains::Result<String> {
            Ok(format!("plain:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            hash == format!("plain:{password}")
        }
    }

    #[tokio::test]
    async fn seeds_users_posts_and_scored_comments() {
        let store = Arc::new(MemoryStore::new());
        seed(store.clone(), &PlainHasher).await.unwrap();

        assert_eq!(UserRepository::list(store.as_ref()).await.unwrap().len(), 3);
        assert_eq!(PostRepository::list(store.as_ref()).await.unwrap().len(), 3);

        let comments = CommentRepository::list(store.as_ref()).await.unwrap();
        let scores: Vec<(String, i32)> = comments.into_iter().map(|c| (c.content, c.score)).collect();
        assert!(scores.contains(&("Great post!".to_string(), 5)));
        assert!(scores.contains(&("Nice post, Jane!".to_string(), 4)));
        assert_eq!(store.find_vote("10.0.0.5", 1).await.unwrap().map(|v| v.value), Some(1));
    }
}

//! `PgStore` against a throwaway Postgres container.

use std::sync::Arc;

use domains::{
    Comment, CommentRepository, DomainError, NewComment, NewPost, PostRepository, UserRepository,
    VoteLedger,
};
use storage_adapters::PgStore;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::testcontainers::ContainerAsync;

async fn store() -> (ContainerAsync<Postgres>, PgStore) {
    let container = Postgres::default().start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");

    let store = PgStore::connect(&url, 8).await.unwrap();
    store.migrate().await.unwrap();
    (container, store)
}

async fn seeded(store: &PgStore) -> Comment {
    let user = UserRepository::create(store, "john_doe", "hash").await.unwrap();
    let post = PostRepository::create(
        store,
        NewPost {
            title: "First Post".into(),
            perex: "A short summary of the first post.".into(),
            content: "This is the content of the first post.".into(),
            author_id: user.id,
        },
    )
    .await
    .unwrap();
    CommentRepository::create(
        store,
        NewComment { content: "Great post!".into(), post_id: post.id, author_id: user.id },
    )
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn concurrent_increments_are_not_lost() {
    let (_pg, store) = store().await;
    let comment = seeded(&store).await;
    let store = Arc::new(store);

    let mut handles = Vec::new();
    for n in 0..32 {
        let store = store.clone();
        let comment_id = comment.id;
        let delta = if n % 2 == 0 { 2 } else { -1 };
        handles.push(tokio::spawn(async move { store.increment_score(comment_id, delta).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let score = CommentRepository::find_by_id(store.as_ref(), comment.id).await.unwrap().unwrap().score;
    assert_eq!(score, 16);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn ledger_key_and_comment_reference_are_enforced() {
    let (_pg, store) = store().await;
    let comment = seeded(&store).await;

    store.record_vote("1.2.3.4", comment.id, 1).await.unwrap();
    assert_eq!(
        store.record_vote("1.2.3.4", comment.id, -1).await.unwrap_err(),
        DomainError::DuplicateVote
    );
    assert_eq!(
        store.record_vote("1.2.3.4", comment.id + 1000, 1).await.unwrap_err(),
        DomainError::CommentNotFound(comment.id + 1000)
    );
    assert_eq!(
        store.increment_score(comment.id + 1000, 1).await.unwrap_err(),
        DomainError::CommentNotFound(comment.id + 1000)
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn revision_is_compare_and_set() {
    let (_pg, store) = store().await;
    let comment = seeded(&store).await;
    let vote = store.record_vote("1.2.3.4", comment.id, 1).await.unwrap();

    let revised = store.revise_vote(vote.id, 1, -1).await.unwrap();
    assert_eq!(revised.value, -1);
    assert_eq!(store.revise_vote(vote.id, 1, -1).await.unwrap_err(), DomainError::AlreadyVoted);
    assert!(matches!(
        store.revise_vote(vote.id + 1000, 1, -1).await.unwrap_err(),
        DomainError::NotFound { .. }
    ));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn deleting_a_post_cascades_to_comments_and_votes() {
    let (_pg, store) = store().await;
    let comment = seeded(&store).await;
    store.record_vote("1.2.3.4", comment.id, 1).await.unwrap();

    PostRepository::delete(&store, comment.post_id).await.unwrap();

    assert!(CommentRepository::find_by_id(&store, comment.id).await.unwrap().is_none());
    assert!(store.find_vote("1.2.3.4", comment.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn taken_username_conflicts() {
    let (_pg, store) = store().await;
    UserRepository::create(&store, "jane_doe", "hash").await.unwrap();
    assert!(matches!(
        UserRepository::create(&store, "jane_doe", "hash").await.unwrap_err(),
        DomainError::Conflict(_)
    ));
}

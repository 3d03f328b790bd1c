//! Integration tests for authors and the shared id registry.

use assert_matches::assert_matches;
use inkwell_core::entity::EntityType;
use inkwell_db::models::author::{CreateAuthor, UpdateAuthor};
use inkwell_db::repositories::{AuthorRepo, NodeRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_author(name: &str, username: &str) -> CreateAuthor {
    CreateAuthor {
        name: name.to_string(),
        username: username.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_author_registers_id(pool: PgPool) {
    let author = AuthorRepo::create(&pool, &new_author("Alice", "Alice"))
        .await
        .unwrap();

    assert_eq!(author.name, "Alice");
    assert_eq!(author.username, "alice");
    assert_eq!(
        NodeRepo::type_of(&pool, author.id).await.unwrap(),
        Some(EntityType::Author)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_username_violates_unique_constraint(pool: PgPool) {
    AuthorRepo::create(&pool, &new_author("Alice", "alice"))
        .await
        .unwrap();
    let err = AuthorRepo::create(&pool, &new_author("Other Alice", "ALICE"))
        .await
        .unwrap_err();

    assert_matches!(
        &err,
        sqlx::Error::Database(db) if db.constraint() == Some("uq_authors_username")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_by_username_ignores_case(pool: PgPool) {
    let created = AuthorRepo::create(&pool, &new_author("Bob", "bob"))
        .await
        .unwrap();

    let found = AuthorRepo::find_by_username(&pool, "BoB")
        .await
        .unwrap()
        .expect("author should be found");
    assert_eq!(found.id, created.id);
    assert!(AuthorRepo::find_by_username(&pool, "nobody")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_author_applies_only_given_fields(pool: PgPool) {
    let author = AuthorRepo::create(&pool, &new_author("Carol", "carol"))
        .await
        .unwrap();

    let updated = AuthorRepo::update(
        &pool,
        author.id,
        &UpdateAuthor {
            username: Some("CaroLine".to_string()),
            ..UpdateAuthor::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.name, "Carol");
    assert_eq!(updated.username, "caroline");
    assert_eq!(updated.password_hash, author.password_hash);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_and_batch_find(pool: PgPool) {
    let a = AuthorRepo::create(&pool, &new_author("A", "a")).await.unwrap();
    let b = AuthorRepo::create(&pool, &new_author("B", "b")).await.unwrap();

    let all = AuthorRepo::list(&pool).await.unwrap();
    assert_eq!(all.len(), 2);

    let found = AuthorRepo::find_by_ids(&pool, &[b.id, uuid::Uuid::new_v4(), a.id])
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_allocates_distinct_tagged_ids(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let first = NodeRepo::register(&mut tx, EntityType::Draft).await.unwrap();
    let second = NodeRepo::register(&mut tx, EntityType::Edit).await.unwrap();
    tx.commit().await.unwrap();

    assert_ne!(first, second);
    let mut types = NodeRepo::types_of(&pool, &[first, second, uuid::Uuid::new_v4()])
        .await
        .unwrap();
    types.sort_by_key(|(_, kind)| kind.as_str());
    assert_eq!(types, vec![(first, EntityType::Draft), (second, EntityType::Edit)]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_id_has_no_type(pool: PgPool) {
    assert_eq!(
        NodeRepo::type_of(&pool, uuid::Uuid::new_v4()).await.unwrap(),
        None
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_by_name_returns_earliest_match(pool: PgPool) {
    let first = AuthorRepo::create(&pool, &new_author("Sam", "sam1")).await.unwrap();
    // created_at has millisecond precision
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    AuthorRepo::create(&pool, &new_author("Sam", "sam2")).await.unwrap();

    let found = AuthorRepo::find_by_name(&pool, "Sam").await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
    assert!(AuthorRepo::find_by_name(&pool, "Nobody").await.unwrap().is_none());
}

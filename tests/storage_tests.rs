/// Storage tests against an in-memory SQLite database
/// Covers user accounts, sessions, chat history, and the cascade rules.
use rust_travel_api::auth::{hash_password, verify_password};
use rust_travel_api::db::Database;
use rust_travel_api::db_storage::{ChatStorage, UserStorage};
use rust_travel_api::errors::AppError;

async fn test_db() -> Database {
    Database::new("sqlite::memory:")
        .await
        .expect("in-memory database")
}

#[tokio::test]
async fn create_and_find_user() {
    let db = test_db().await;
    let users = UserStorage::new(db.pool.clone());

    let hash = hash_password("a strong password").unwrap();
    let created = users.create_user("alice", &hash).await.unwrap();
    assert_eq!(created.username, "alice");
    assert_ne!(created.password_hash, "a strong password");

    let found = users.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(verify_password("a strong password", &found.password_hash));

    let by_id = users.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, "alice");

    assert!(users.find_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let db = test_db().await;
    let users = UserStorage::new(db.pool.clone());

    let hash = hash_password("a strong password").unwrap();
    users.create_user("alice", &hash).await.unwrap();

    let result = users.create_user("alice", &hash).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn session_round_trip_and_logout() {
    let db = test_db().await;
    let users = UserStorage::new(db.pool.clone());

    let hash = hash_password("a strong password").unwrap();
    let user = users.create_user("alice", &hash).await.unwrap();

    let session = users.create_session(&user.id).await.unwrap();
    let resolved = users
        .find_session_user(&session.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.id, user.id);

    users.delete_session(&session.token).await.unwrap();
    assert!(users
        .find_session_user(&session.token)
        .await
        .unwrap()
        .is_none());

    assert!(users.find_session_user("bogus-token").await.unwrap().is_none());
}

#[tokio::test]
async fn chat_history_is_append_only_and_per_user() {
    let db = test_db().await;
    let users = UserStorage::new(db.pool.clone());
    let chats = ChatStorage::new(db.pool.clone());

    let hash = hash_password("a strong password").unwrap();
    let alice = users.create_user("alice", &hash).await.unwrap();
    let bob = users.create_user("bob", &hash).await.unwrap();

    chats
        .record_chat(&alice.id, "Plan a trip from Paris to Rome", "# Itinerary")
        .await
        .unwrap();
    chats
        .record_chat(&alice.id, "I want a vacation", "Please clarify.")
        .await
        .unwrap();
    chats
        .record_chat(&bob.id, "Lisbon to Porto", "# Porto plan")
        .await
        .unwrap();

    let history = chats.list_for_user(&alice.id).await.unwrap();
    assert_eq!(history.len(), 2);
    // Oldest first, message preserved verbatim.
    assert_eq!(history[0].message, "Plan a trip from Paris to Rome");
    assert_eq!(history[0].response, "# Itinerary");
    assert_eq!(history[1].message, "I want a vacation");

    let bobs = chats.list_for_user(&bob.id).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].message, "Lisbon to Porto");
}

#[tokio::test]
async fn deleting_a_user_cascades_to_sessions_and_chats() {
    let db = test_db().await;
    let users = UserStorage::new(db.pool.clone());
    let chats = ChatStorage::new(db.pool.clone());

    let hash = hash_password("a strong password").unwrap();
    let alice = users.create_user("alice", &hash).await.unwrap();
    let session = users.create_session(&alice.id).await.unwrap();
    chats
        .record_chat(&alice.id, "Paris to Rome", "# Itinerary")
        .await
        .unwrap();

    users.delete_user(&alice.id).await.unwrap();

    assert!(users.find_by_id(&alice.id).await.unwrap().is_none());
    assert!(users
        .find_session_user(&session.token)
        .await
        .unwrap()
        .is_none());

    let (chat_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chats")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(chat_count, 0);
    let (session_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(session_count, 0);
}

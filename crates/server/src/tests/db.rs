//! Runs against a live Postgres: `cargo test -- --ignored` with the development database up.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use tokio::sync::Mutex;

use crate::auth::password::{hash_password, verify_password};
use crate::database::connection::{DbConfig, DbConnection};
use crate::error::{RequestError, ValidationError};
use crate::models::listing::PageRequest;
use crate::timeline::store::FollowGraph;
use crate::timeline::{get_global_timeline, get_personal_feed};

/// Some tests can't run in parallel, prevent them from breaking each other's state
static SERIAL_LOCK: Lazy<Mutex<()>> = Lazy::new(Mutex::default);

async fn init_and_get_db() -> DbConnection {
    let _ = tracing_subscriber::fmt::try_init();

    let config = DbConfig::development("murmur_db", "murmur_guest", "murmurpass");
    let db = DbConnection::connect(&config).await.unwrap();
    db.drop_schema().await.unwrap();
    db.init_schema().await.unwrap();
    db
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn signup_and_credentials() {
    let _lock = SERIAL_LOCK.lock().await;
    let db = init_and_get_db().await;

    let user = db
        .create_user("its_benjamin", hash_password("kobrabor").unwrap())
        .await
        .unwrap();
    assert_eq!(user.name, "its_benjamin");

    let credentials = db.find_credentials("its_benjamin").await.unwrap().unwrap();
    assert_eq!(credentials.user_id, user.id);
    assert!(verify_password("kobrabor", &credentials.hashed_password).unwrap());
    assert!(db.find_credentials("nobody").await.unwrap().is_none());

    let err = db
        .create_user("its_benjamin", hash_password("bobrabor").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RequestError::Validation(ValidationError::AlreadyExists)
    ));

    assert_eq!(db.find_user(user.id).await.unwrap(), Some(user));
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn follow_graph_roundtrip() {
    let _lock = SERIAL_LOCK.lock().await;
    let db = init_and_get_db().await;

    let a = db.create_user("user_a", "x".to_string()).await.unwrap();
    let b = db.create_user("user_b", "x".to_string()).await.unwrap();
    let c = db.create_user("user_c", "x".to_string()).await.unwrap();

    db.follow(a.id, b.id).await.unwrap();
    db.follow(a.id, b.id).await.unwrap();
    db.follow(c.id, b.id).await.unwrap();
    assert!(matches!(
        db.follow(a.id, a.id).await.unwrap_err(),
        RequestError::Validation(ValidationError::InvalidInput { .. })
    ));
    assert!(matches!(
        db.follow(a.id, uuid::Uuid::now_v7()).await.unwrap_err(),
        RequestError::Validation(ValidationError::NotFound)
    ));

    assert_eq!(db.followees(a.id).await.unwrap(), HashSet::from([b.id]));
    assert_eq!(db.followers(b.id).await.unwrap(), HashSet::from([a.id, c.id]));
    let followers: Vec<_> = db
        .list_followers(b.id)
        .await
        .unwrap()
        .into_iter()
        .map(|user| user.name)
        .collect();
    assert_eq!(followers, ["user_c", "user_a"]);

    db.unfollow(a.id, b.id).await.unwrap();
    db.unfollow(a.id, b.id).await.unwrap();
    assert!(db.followees(a.id).await.unwrap().is_empty());
    assert!(db.list_followees(a.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn timelines_over_postgres() {
    let _lock = SERIAL_LOCK.lock().await;
    let db = init_and_get_db().await;

    let viewer = db.create_user("viewer", "x".to_string()).await.unwrap();
    let a = db.create_user("user_a", "x".to_string()).await.unwrap();
    let b = db.create_user("user_b", "x".to_string()).await.unwrap();
    let stranger = db.create_user("stranger", "x".to_string()).await.unwrap();
    db.follow(viewer.id, a.id).await.unwrap();
    db.follow(viewer.id, b.id).await.unwrap();

    for (author, body) in [
        (a.id, "a1"),
        (b.id, "b1"),
        (stranger.id, "s1"),
        (a.id, "a2"),
        (b.id, "b2"),
        (a.id, "a3"),
    ] {
        db.post_message(author, body).await.unwrap();
    }

    let global = get_global_timeline(&db, &PageRequest::offset(4, 0).unwrap())
        .await
        .unwrap();
    let bodies: Vec<_> = global.items.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, ["a3", "b2", "a2", "s1"]);
    assert_eq!(global.page_info.next_offset, Some(4));

    let first = get_personal_feed(&db, &db, Some(viewer.id), &PageRequest::offset(3, 0).unwrap())
        .await
        .unwrap();
    let bodies: Vec<_> = first.items.iter().map(|i| i.message.body.as_str()).collect();
    assert_eq!(bodies, ["a3", "b2", "a2"]);
    assert_eq!(first.page_info.next_offset, Some(3));
    assert_eq!(first.items[0].user.name, "user_a");

    let second = get_personal_feed(&db, &db, Some(viewer.id), &PageRequest::offset(3, 3).unwrap())
        .await
        .unwrap();
    let bodies: Vec<_> = second.items.iter().map(|i| i.message.body.as_str()).collect();
    assert_eq!(bodies, ["b1", "a1"]);
    assert_eq!(second.page_info.next_offset, None);

    let lonely = get_personal_feed(
        &db,
        &db,
        Some(stranger.id),
        &PageRequest::offset(20, 0).unwrap(),
    )
    .await
    .unwrap();
    assert!(lonely.items.is_empty());
}

use sustainshare_backend::{db, seed};

mod common;

#[tokio::test]
async fn uniqueness_checks_see_registered_users() {
    let (_dir, pool) = common::test_pool();
    common::register_user(&pool, "Dana", "Donor").await;

    assert!(db::username_taken(&pool, "dana").await.expect("check"));
    assert!(db::email_taken(&pool, "dana@example.com").await.expect("check"));
    assert!(!db::username_taken(&pool, "someoneelse").await.expect("check"));
    assert!(!db::email_taken(&pool, "other@example.com").await.expect("check"));
}

#[tokio::test]
async fn authenticate_matches_trimmed_plaintext_credentials() {
    let (_dir, pool) = common::test_pool();
    let dana = common::register_user(&pool, "Dana", "Donor").await;

    let authed = db::authenticate_user(&pool, "  dana@example.com  ", " pw ")
        .await
        .expect("auth");
    assert_eq!(authed.map(|u| u.id), Some(dana.id));

    assert!(db::authenticate_user(&pool, "dana@example.com", "wrong")
        .await
        .expect("auth")
        .is_none());
    assert!(db::authenticate_user(&pool, "nobody@example.com", "pw")
        .await
        .expect("auth")
        .is_none());
}

#[tokio::test]
async fn lookup_by_id_email_and_count() {
    let (_dir, pool) = common::test_pool();
    let dana = common::register_user(&pool, "Dana", "Donor").await;
    common::register_user(&pool, "Shelter", "Charity").await;

    let by_id = db::get_user(&pool, dana.id).await.expect("get");
    assert_eq!(by_id.map(|u| u.username), Some("dana".to_string()));

    let by_email = db::get_user_by_email(&pool, "dana@example.com")
        .await
        .expect("get");
    assert_eq!(by_email.map(|u| u.id), Some(dana.id));

    assert!(db::get_user(&pool, 999).await.expect("get").is_none());
    assert_eq!(db::count_users(&pool).await.expect("count"), 2);
}

#[tokio::test]
async fn demo_seeding_is_idempotent() {
    let (_dir, pool) = common::test_pool();

    seed::create_demo_users(&pool).await.expect("seed");
    seed::create_demo_users(&pool).await.expect("seed again");

    assert_eq!(db::count_users(&pool).await.expect("count"), 3);

    let donor = db::authenticate_user(&pool, "donor@example.com", "donorpass")
        .await
        .expect("auth")
        .expect("demo donor present");
    assert_eq!(donor.role, "Donor");
}

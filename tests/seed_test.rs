mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use threaded_posts::services::SeedConfig;
use threaded_posts::AppError;

#[tokio::test]
async fn test_seed_creates_users_and_posts() {
    let state = common::test_state();
    let mut rng = StdRng::seed_from_u64(7);

    let report = state.seed_service()
        .run(&SeedConfig::default(), &mut rng)
        .await
        .expect("seeding should succeed on an empty store");

    assert_eq!(report.users_created, 10);
    assert_eq!(report.posts_created, 100);
    assert_eq!(state.user_service.count_users().await.unwrap(), 10);
    assert_eq!(state.post_service.count_posts().await.unwrap(), 100);

    let users = state.user_service.list_users().await.unwrap();
    let emails: HashSet<String> = users.iter().map(|u| u.email.clone()).collect();
    let expected: HashSet<String> = (0..10).map(|i| format!("email_{}@mail.com", i)).collect();
    assert_eq!(emails, expected);

    let user_ids: HashSet<_> = users.iter().map(|u| u.id).collect();
    let posts = state.post_service.get_posts_with_users().await.unwrap();
    assert!(posts.iter().all(|p| user_ids.contains(&p.user.id)));

    let titles: HashSet<String> = posts.iter().map(|p| p.title.clone()).collect();
    assert!(titles.contains("Post title: 0"));
    assert!(titles.contains("Post title: 99"));
    assert!(posts.iter().any(|p| p.content == "Post content: 42"));

    // 100 draws over 10 owners should not all land on one user
    let owners: HashSet<_> = posts.iter().map(|p| p.user.id).collect();
    assert!(owners.len() > 1);
}

#[tokio::test]
async fn test_seeded_passwords_verify() {
    let state = common::test_state();
    let config = SeedConfig { user_count: 2, post_count: 1, ..SeedConfig::default() };
    state.seed_service().run(&config, &mut StdRng::seed_from_u64(1)).await.unwrap();

    for user in state.user_service.list_users().await.unwrap() {
        assert!(state.auth_service.verify_password("Password123", &user.password_hash).unwrap());
    }
}

#[tokio::test]
async fn test_seed_is_not_idempotent() {
    let state = common::test_state();
    let seeder = state.seed_service();
    let config = SeedConfig { user_count: 3, post_count: 5, ..SeedConfig::default() };

    seeder.run(&config, &mut StdRng::seed_from_u64(1)).await.unwrap();
    let err = seeder.run(&config, &mut StdRng::seed_from_u64(2)).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(state.user_service.count_users().await.unwrap(), 3);
    assert_eq!(state.post_service.count_posts().await.unwrap(), 5);
}

#[tokio::test]
async fn test_posts_without_users_fail() {
    let state = common::test_state();
    let config = SeedConfig { user_count: 0, post_count: 1, ..SeedConfig::default() };

    let err = state.seed_service().run(&config, &mut StdRng::seed_from_u64(3)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_owners_are_drawn_from_all_users() {
    let state = common::test_state();
    // A user that exists before seeding is eligible as an owner too
    let first = SeedConfig { user_count: 1, post_count: 0, ..SeedConfig::default() };
    state.seed_service().run(&first, &mut StdRng::seed_from_u64(4)).await.unwrap();

    let users_before = state.user_service.list_users().await.unwrap();
    let pre_existing = users_before[0].id;

    // Posts only; no new users
    let posts_only = SeedConfig { user_count: 0, post_count: 20, ..SeedConfig::default() };
    state.seed_service().run(&posts_only, &mut StdRng::seed_from_u64(5)).await.unwrap();

    let posts = state.post_service.get_posts_with_users().await.unwrap();
    assert_eq!(posts.len(), 20);
    assert!(posts.iter().all(|p| p.user.id == pre_existing));
}

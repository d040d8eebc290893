//! Startup seeding from a data directory, using the repository's own
//! dev-data files.

use std::path::PathBuf;

use ridgeline::{AppConfig, AppState, ReadPlan};

fn dev_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("dev-data")
}

async fn seeded_state() -> AppState {
    let config = AppConfig {
        seed_dir: Some(dev_data_dir()),
        ..AppConfig::default()
    };
    AppState::new(config).await.expect("seeded state")
}

#[tokio::test]
async fn seeding_loads_all_three_collections() {
    let state = seeded_state().await;

    let tours = state
        .tours
        .find_many(&ReadPlan::default())
        .await
        .expect("tours");
    // One seeded tour is secret and hidden from the listing.
    assert_eq!(tours.matched, 4);

    let users = state
        .users
        .find_many(&ReadPlan::default())
        .await
        .expect("users");
    assert_eq!(users.matched, 5);

    let reviews = state
        .reviews
        .find_many(&ReadPlan::default(), None)
        .await
        .expect("reviews");
    assert_eq!(reviews.matched, 4);
}

#[tokio::test]
async fn seeding_recomputes_rating_stats() {
    let state = seeded_state().await;

    let forest = state
        .tours
        .find_by_id("tour-forest-hiker")
        .await
        .expect("forest hiker");
    assert_eq!(forest.i64("ratingsQuantity").expect("quantity"), 2);
    assert_eq!(forest.number("ratingsAverage").expect("average"), 4.0);

    // No reviews: stays at the domain default.
    let city = state
        .tours
        .find_by_id("tour-city-wanderer")
        .await
        .expect("city wanderer");
    assert_eq!(city.i64("ratingsQuantity").expect("quantity"), 0);
    assert_eq!(city.number("ratingsAverage").expect("average"), 4.5);
}

#[tokio::test]
async fn malformed_seed_files_fail_startup_with_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("tours.json"), "{ not json").expect("write");

    let config = AppConfig {
        seed_dir: Some(dir.path().to_path_buf()),
        ..AppConfig::default()
    };
    let err = AppState::new(config).await.expect_err("bad seed");
    assert_eq!(err.code_str(), "validation");
    assert!(err.to_string().contains("tours.json"));
}

#[tokio::test]
async fn seeded_passwords_are_stored_hashed() {
    let state = seeded_state().await;

    let admin = state
        .users
        .find_by_email_with_password("admin@ridgeline.io")
        .await
        .expect("lookup")
        .expect("admin present");
    let stored = admin.text("password").expect("password hash");
    assert_ne!(stored, "admin-pass-123");
    assert!(ridgeline::auth::password::verify("admin-pass-123", stored));
}

//! Tour operations: visibility scoping on every named read operation,
//! uniqueness, cross-field patch validation, and the aggregation reports.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use ridgeline::domain::tour::{Difficulty, TourInput, TourPatch};
use ridgeline::domain::Tours;
use ridgeline::store::document::{Document, Value};
use ridgeline::{DocumentStore, MemoryStore};

struct Fixture {
    store: Arc<MemoryStore>,
    tours: Tours,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn DocumentStore> = store.clone();
    Fixture {
        store,
        tours: Tours::new(dyn_store),
    }
}

fn input(name: &str, price: f64, difficulty: Difficulty) -> TourInput {
    TourInput {
        name: name.to_string(),
        duration: 5,
        max_group_size: 20,
        difficulty,
        price,
        price_discount: None,
        summary: "A test itinerary of reasonable length".to_string(),
        description: None,
        image_cover: "cover.jpg".to_string(),
        images: Vec::new(),
        start_dates: Vec::new(),
        secret_tour: false,
    }
}

#[tokio::test]
async fn duplicate_tour_names_conflict() {
    let f = fixture();
    f.tours
        .create(input("The Forest Hiker", 397.0, Difficulty::Easy))
        .await
        .expect("first");
    let err = f
        .tours
        .create(input("The Forest Hiker", 400.0, Difficulty::Easy))
        .await
        .expect_err("duplicate name");
    assert_eq!(err.code_str(), "conflict");
}

#[tokio::test]
async fn update_revalidates_the_discount_against_the_effective_price() {
    let f = fixture();
    let tour = f
        .tours
        .create(input("The Forest Hiker", 400.0, Difficulty::Easy))
        .await
        .expect("create");
    let id = tour.id().expect("id").to_string();

    // Discount above the stored price is rejected.
    let err = f
        .tours
        .find_and_update(
            &id,
            TourPatch {
                price_discount: Some(450.0),
                ..TourPatch::default()
            },
        )
        .await
        .expect_err("discount too high");
    assert_eq!(err.code_str(), "validation");

    // Raising the price in the same patch makes the discount valid.
    let updated = f
        .tours
        .find_and_update(
            &id,
            TourPatch {
                price: Some(500.0),
                price_discount: Some(450.0),
                ..TourPatch::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.number("priceDiscount").expect("discount"), 450.0);
}

#[tokio::test]
async fn renaming_updates_the_slug() {
    let f = fixture();
    let tour = f
        .tours
        .create(input("The Forest Hiker", 397.0, Difficulty::Easy))
        .await
        .expect("create");
    let id = tour.id().expect("id").to_string();

    let updated = f
        .tours
        .find_and_update(
            &id,
            TourPatch {
                name: Some("The Desert Strider".to_string()),
                ..TourPatch::default()
            },
        )
        .await
        .expect("rename");
    assert_eq!(updated.text("slug").expect("slug"), "the-desert-strider");
}

#[tokio::test]
async fn secret_tours_are_invisible_to_update_and_delete() {
    let f = fixture();
    f.store
        .insert(
            "tours",
            Document::new()
                .with("id", Value::Text("hidden".into()))
                .with("name", Value::Text("The Hidden Valley".into()))
                .with("secretTour", Value::Boolean(true)),
        )
        .await
        .expect("seed");

    let err = f
        .tours
        .find_and_update("hidden", TourPatch::default())
        .await
        .expect_err("update hidden");
    assert_eq!(err.code_str(), "not_found");

    let err = f
        .tours
        .find_and_delete("hidden")
        .await
        .expect_err("delete hidden");
    assert_eq!(err.code_str(), "not_found");
    assert_eq!(f.store.count("tours"), 1);
}

#[tokio::test]
async fn delete_removes_the_tour() {
    let f = fixture();
    let tour = f
        .tours
        .create(input("The Forest Hiker", 397.0, Difficulty::Easy))
        .await
        .expect("create");
    let id = tour.id().expect("id").to_string();

    f.tours.find_and_delete(&id).await.expect("delete");
    assert_eq!(f.store.count("tours"), 0);
    let err = f.tours.find_by_id(&id).await.expect_err("gone");
    assert_eq!(err.code_str(), "not_found");
}

#[tokio::test]
async fn stats_group_well_rated_tours_excluding_easy() {
    let f = fixture();
    let seeds = [
        ("A Tour Of Medium Hills", "medium", 500.0, 4.8, 10),
        ("Another Medium Wander", "medium", 300.0, 4.6, 20),
        ("A Difficult Ridge Push", "difficult", 900.0, 4.9, 5),
        ("An Easy Meadow Stroll", "easy", 200.0, 4.9, 30),
        ("A Poorly Rated Slog", "difficult", 100.0, 3.0, 2),
    ];
    for (name, difficulty, price, rating, quantity) in seeds {
        f.store
            .insert(
                "tours",
                Document::new()
                    .with("name", Value::Text(name.into()))
                    .with("difficulty", Value::Text(difficulty.into()))
                    .with("price", Value::Float(price))
                    .with("ratingsAverage", Value::Float(rating))
                    .with("ratingsQuantity", Value::Integer(quantity)),
            )
            .await
            .expect("seed");
    }

    let stats = f.tours.stats().await.expect("stats");
    // EASY is excluded and the poorly rated tour never enters a group;
    // ascending average price puts MEDIUM before DIFFICULT.
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].difficulty, "MEDIUM");
    assert_eq!(stats[0].num_tours, 2);
    assert_eq!(stats[0].num_ratings, 30);
    assert_eq!(stats[0].avg_price, 400.0);
    assert_eq!(stats[0].min_price, 300.0);
    assert_eq!(stats[0].max_price, 500.0);
    assert_eq!(stats[1].difficulty, "DIFFICULT");
}

#[tokio::test]
async fn monthly_plan_unwinds_start_dates_within_the_year() {
    let f = fixture();
    let july = Utc.with_ymd_and_hms(2021, 7, 20, 9, 0, 0).single().expect("july");
    let june = Utc.with_ymd_and_hms(2021, 6, 19, 9, 0, 0).single().expect("june");
    let july_again = Utc.with_ymd_and_hms(2021, 7, 5, 9, 0, 0).single().expect("july");
    let next_year = Utc.with_ymd_and_hms(2022, 7, 5, 9, 0, 0).single().expect("2022");

    let mut a = input("The Forest Hiker", 397.0, Difficulty::Easy);
    a.start_dates = vec![june, july];
    let mut b = input("The Sea Explorer", 497.0, Difficulty::Medium);
    b.start_dates = vec![july_again, next_year];
    f.tours.create(a).await.expect("create a");
    f.tours.create(b).await.expect("create b");

    let plan = f.tours.monthly_plan(2021).await.expect("plan");
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].month, 7);
    assert_eq!(plan[0].num_tour_starts, 2);
    assert!(plan[0].tours.contains(&"The Forest Hiker".to_string()));
    assert!(plan[0].tours.contains(&"The Sea Explorer".to_string()));
    assert_eq!(plan[1].month, 6);
    assert_eq!(plan[1].num_tour_starts, 1);
}

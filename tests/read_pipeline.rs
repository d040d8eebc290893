//! End-to-end read path: query parameters through the translator, the
//! executor, and the in-memory store.

use std::collections::BTreeMap;
use std::sync::Arc;

use ridgeline::store::document::{Document, Value};
use ridgeline::{DocumentStore, FilterExpr, MemoryStore, ReadExecutor, ReadPlan};

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let tours = [
        ("t1", "The Forest Hiker", "easy", 397.0, 4.7, 10),
        ("t2", "The Sea Explorer", "medium", 497.0, 4.8, 20),
        ("t3", "The Snow Adventurer", "difficult", 997.0, 4.5, 30),
        ("t4", "The City Wanderer", "easy", 1197.0, 4.6, 40),
        ("t5", "The Park Camper", "medium", 1497.0, 4.9, 50),
    ];
    for (id, name, difficulty, price, rating, created) in tours {
        store
            .insert(
                "tours",
                Document::new()
                    .with("id", Value::Text(id.into()))
                    .with("name", Value::Text(name.into()))
                    .with("difficulty", Value::Text(difficulty.into()))
                    .with("price", Value::Float(price))
                    .with("ratingsAverage", Value::Float(rating))
                    .with("createdAt", Value::Timestamp(created)),
            )
            .await
            .expect("seed tour");
    }
    store
}

#[tokio::test]
async fn filters_from_parameters_narrow_the_result_set() {
    let store = seeded_store().await;
    let executor = ReadExecutor::new(store);

    let plan = ReadPlan::from_params(&params(&[
        ("difficulty", "easy"),
        ("price[lt]", "1000"),
    ]));
    let result = executor.execute("tours", &plan, None).await.expect("execute");

    assert_eq!(result.matched, 1);
    assert_eq!(result.documents[0].text("name").unwrap(), "The Forest Hiker");
}

#[tokio::test]
async fn range_operators_combine_on_the_same_field() {
    let store = seeded_store().await;
    let executor = ReadExecutor::new(store);

    let plan = ReadPlan::from_params(&params(&[
        ("price[gte]", "497"),
        ("price[lte]", "1197"),
    ]));
    let result = executor.execute("tours", &plan, None).await.expect("execute");

    assert_eq!(result.matched, 3);
}

#[tokio::test]
async fn default_sort_is_newest_first() {
    let store = seeded_store().await;
    let executor = ReadExecutor::new(store);

    let result = executor
        .execute("tours", &ReadPlan::from_params(&params(&[])), None)
        .await
        .expect("execute");

    let ids: Vec<&str> = result.documents.iter().map(|d| d.id().unwrap()).collect();
    assert_eq!(ids, vec!["t5", "t4", "t3", "t2", "t1"]);
}

#[tokio::test]
async fn explicit_sort_with_descending_prefix() {
    let store = seeded_store().await;
    let executor = ReadExecutor::new(store);

    let plan = ReadPlan::from_params(&params(&[("sort", "-ratingsAverage,price")]));
    let result = executor.execute("tours", &plan, None).await.expect("execute");

    let first = &result.documents[0];
    assert_eq!(first.text("name").unwrap(), "The Park Camper");
}

#[tokio::test]
async fn projection_keeps_requested_fields_plus_id() {
    let store = seeded_store().await;
    let executor = ReadExecutor::new(store);

    let plan = ReadPlan::from_params(&params(&[("fields", "name,price")]));
    let result = executor.execute("tours", &plan, None).await.expect("execute");

    for doc in &result.documents {
        assert!(doc.get("id").is_some());
        assert!(doc.get("name").is_some());
        assert!(doc.get("price").is_some());
        assert!(doc.get("difficulty").is_none());
        assert!(doc.get("_rev").is_none());
    }
}

#[tokio::test]
async fn default_projection_hides_the_revision_field() {
    let store = seeded_store().await;
    let executor = ReadExecutor::new(store);

    let result = executor
        .execute("tours", &ReadPlan::default(), None)
        .await
        .expect("execute");
    assert!(result.documents.iter().all(|d| d.get("_rev").is_none()));
}

#[tokio::test]
async fn pagination_windows_the_filtered_set() {
    let store = seeded_store().await;
    let executor = ReadExecutor::new(store);

    let plan = ReadPlan::from_params(&params(&[
        ("sort", "price"),
        ("page", "2"),
        ("limit", "2"),
    ]));
    let result = executor.execute("tours", &plan, None).await.expect("execute");

    assert_eq!(result.matched, 5);
    assert_eq!(result.documents.len(), 2);
    assert_eq!(result.documents[0].id().unwrap(), "t3");
}

#[tokio::test]
async fn malformed_page_parameters_fall_back_instead_of_failing() {
    let store = seeded_store().await;
    let executor = ReadExecutor::new(store);

    let plan = ReadPlan::from_params(&params(&[("page", "abc"), ("limit", "zero")]));
    let result = executor.execute("tours", &plan, None).await.expect("execute");

    assert_eq!(result.documents.len(), 5);
}

#[tokio::test]
async fn base_filter_scopes_independently_of_user_filters() {
    let store = seeded_store().await;
    let executor = ReadExecutor::new(store);

    // A caller-supplied filter cannot escape the base constraint.
    let plan = ReadPlan::from_params(&params(&[("difficulty", "easy")]));
    let base = FilterExpr::Gte("price".to_string(), Value::Float(1000.0));
    let result = executor
        .execute("tours", &plan, Some(&base))
        .await
        .expect("execute");

    assert_eq!(result.matched, 1);
    assert_eq!(result.documents[0].id().unwrap(), "t4");
}

#[tokio::test]
async fn unknown_filter_fields_match_nothing() {
    let store = seeded_store().await;
    let executor = ReadExecutor::new(store);

    let plan = ReadPlan::from_params(&params(&[("flavour", "vanilla")]));
    let result = executor.execute("tours", &plan, None).await.expect("execute");
    assert_eq!(result.matched, 0);
}

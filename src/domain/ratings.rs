//! Denormalized rating statistics on tours.
//!
//! A tour carries `ratingsQuantity` and `ratingsAverage` derived from its
//! reviews. They are recomputed from scratch after every review mutation and
//! persisted in a single parent write; recomputation is idempotent and
//! serialized per owner so concurrent review mutations against the same tour
//! cannot interleave the read-modify-write.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::domain::collections;
use crate::domain::review::fields as review_fields;
use crate::domain::tour::fields as tour_fields;
use crate::error::Error;
use crate::query::plan::{FilterExpr, ReadPlan};
use crate::store::document::{Document, Value};
use crate::store::DocumentStore;

/// Average reported for a tour with no reviews.
pub const DEFAULT_AVERAGE: f64 = 4.5;

pub struct RatingsMaintainer {
    store: Arc<dyn DocumentStore>,
    owner_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl RatingsMaintainer {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            owner_locks: Mutex::new(HashMap::new()),
        }
    }

    fn owner_lock(&self, owner_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.owner_locks
            .lock()
            .entry(owner_id.to_string())
            .or_default()
            .clone()
    }

    /// Derives the owner's statistics fresh from its current review set and
    /// persists both fields in one write. A missing owner (deleted while
    /// the mutation was in flight) downgrades to a no-op.
    pub async fn recompute(&self, owner_id: &str) -> Result<(), Error> {
        let lock = self.owner_lock(owner_id);
        let _guard = lock.lock().await;

        let plan = ReadPlan::unpaged().with_predicate(FilterExpr::Eq(
            review_fields::TOUR.to_string(),
            Value::Text(owner_id.to_string()),
        ));
        let result = self.store.find(collections::REVIEWS, &plan, None).await?;

        let quantity = result.matched;
        let ratings: Vec<f64> = result
            .documents
            .iter()
            .filter_map(|doc| doc.number(review_fields::RATING).ok())
            .collect();
        let average = if ratings.is_empty() {
            DEFAULT_AVERAGE
        } else {
            round_one_decimal(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };

        let patch = Document::new()
            .with(
                tour_fields::RATINGS_QUANTITY,
                Value::Integer(quantity as i64),
            )
            .with(tour_fields::RATINGS_AVERAGE, Value::Float(average));

        match self.store.update(collections::TOURS, owner_id, patch).await? {
            Some(_) => {
                info!(owner_id, quantity, average, "recomputed rating stats");
                Ok(())
            }
            None => {
                debug!(owner_id, "owner missing during recompute, skipping");
                Ok(())
            }
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

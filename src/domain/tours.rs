//! Tour operations. The visibility base filter (`secretTour != true`) is
//! applied explicitly by each of the named read operations rather than by
//! any implicit hook, so every code path that can observe a tour names its
//! scoping in one place.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::tour::{fields, TourInput, TourPatch};
use crate::domain::{collections, now_millis, validate};
use crate::error::{Error, Resource};
use crate::query::exec::{self, FindResult, ReadExecutor};
use crate::query::plan::{FilterExpr, Projection, ReadPlan};
use crate::store::document::{Document, Value};
use crate::store::DocumentStore;

/// Scoping filter for all externally visible tour reads.
pub(crate) fn visible_filter() -> FilterExpr {
    FilterExpr::Ne(fields::SECRET_TOUR.to_string(), Value::Boolean(true))
}

#[derive(Clone)]
pub struct Tours {
    store: Arc<dyn DocumentStore>,
    executor: ReadExecutor,
}

impl Tours {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let executor = ReadExecutor::new(store.clone());
        Self { store, executor }
    }

    pub async fn find_many(&self, plan: &ReadPlan) -> Result<FindResult, Error> {
        self.executor
            .execute(collections::TOURS, plan, Some(&visible_filter()))
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Document, Error> {
        let mut doc = self
            .store
            .get(collections::TOURS, id)
            .await?
            .filter(|doc| exec::matches(doc, &visible_filter()))
            .ok_or_else(|| Error::not_found(Resource::Tour, id))?;
        exec::project(&mut doc, &Projection::DefaultExclude);
        Ok(doc)
    }

    pub async fn create(&self, input: TourInput) -> Result<Document, Error> {
        input.validate()?;
        self.ensure_name_free(&input.name, None).await?;

        let mut doc = self
            .store
            .insert(collections::TOURS, input.into_document(now_millis()))
            .await?;
        info!(id = doc.id().unwrap_or_default(), "created tour");
        exec::project(&mut doc, &Projection::DefaultExclude);
        Ok(doc)
    }

    pub async fn find_and_update(&self, id: &str, patch: TourPatch) -> Result<Document, Error> {
        patch.validate()?;
        let current = self
            .store
            .get(collections::TOURS, id)
            .await?
            .filter(|doc| exec::matches(doc, &visible_filter()))
            .ok_or_else(|| Error::not_found(Resource::Tour, id))?;

        if let Some(name) = &patch.name {
            if current.text(fields::NAME).ok() != Some(name.as_str()) {
                self.ensure_name_free(name, Some(id)).await?;
            }
        }
        // The discount bound is whichever price the update will leave behind.
        if let Some(discount) = patch.price_discount {
            let price = patch
                .price
                .or_else(|| current.number(fields::PRICE).ok())
                .unwrap_or(0.0);
            validate::below(fields::PRICE_DISCOUNT, discount, fields::PRICE, price)?;
        }

        let mut updated = self
            .store
            .update(collections::TOURS, id, patch.into_patch())
            .await?
            .ok_or_else(|| Error::not_found(Resource::Tour, id))?;
        exec::project(&mut updated, &Projection::DefaultExclude);
        Ok(updated)
    }

    pub async fn find_and_delete(&self, id: &str) -> Result<(), Error> {
        self.store
            .get(collections::TOURS, id)
            .await?
            .filter(|doc| exec::matches(doc, &visible_filter()))
            .ok_or_else(|| Error::not_found(Resource::Tour, id))?;
        self.store.delete(collections::TOURS, id).await?;
        info!(id, "deleted tour");
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, except_id: Option<&str>) -> Result<(), Error> {
        let plan = ReadPlan::unpaged().with_predicate(FilterExpr::Eq(
            fields::NAME.to_string(),
            Value::Text(name.to_string()),
        ));
        let existing = self.store.find(collections::TOURS, &plan, None).await?;
        let taken = existing
            .documents
            .iter()
            .any(|doc| doc.id().ok() != except_id);
        if taken {
            return Err(Error::Conflict(format!("tour name '{name}' is already in use")));
        }
        Ok(())
    }

    /// Rating and price statistics per difficulty, over well-rated tours.
    pub async fn stats(&self) -> Result<Vec<DifficultyStats>, Error> {
        let plan = ReadPlan::unpaged().with_predicate(FilterExpr::Gte(
            fields::RATINGS_AVERAGE.to_string(),
            Value::Float(4.5),
        ));
        let result = self.store.find(collections::TOURS, &plan, None).await?;

        let mut groups: HashMap<String, StatsAccumulator> = HashMap::new();
        for doc in &result.documents {
            let Ok(difficulty) = doc.text(fields::DIFFICULTY) else {
                continue;
            };
            let group = groups.entry(difficulty.to_uppercase()).or_default();
            group.num_tours += 1;
            group.num_ratings += doc.i64(fields::RATINGS_QUANTITY).unwrap_or(0);
            group.rating_sum += doc.number(fields::RATINGS_AVERAGE).unwrap_or(0.0);
            let price = doc.number(fields::PRICE).unwrap_or(0.0);
            group.price_sum += price;
            group.min_price = group.min_price.min(price);
            group.max_price = group.max_price.max(price);
        }

        let mut stats: Vec<DifficultyStats> = groups
            .into_iter()
            .filter(|(difficulty, _)| difficulty != "EASY")
            .map(|(difficulty, acc)| acc.finish(difficulty))
            .collect();
        stats.sort_by(|a, b| a.avg_price.total_cmp(&b.avg_price));
        Ok(stats)
    }

    /// Tour starts per month of one year, busiest month first.
    pub async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthPlan>, Error> {
        let result = self
            .store
            .find(collections::TOURS, &ReadPlan::unpaged(), None)
            .await?;

        let mut months: HashMap<u32, MonthPlan> = HashMap::new();
        for doc in &result.documents {
            let Ok(name) = doc.text(fields::NAME) else {
                continue;
            };
            let Ok(dates) = doc.list(fields::START_DATES) else {
                continue;
            };
            for date in dates {
                let Value::Timestamp(ms) = date else {
                    continue;
                };
                let Some(dt) = DateTime::<Utc>::from_timestamp_millis(*ms) else {
                    continue;
                };
                if dt.year() != year {
                    continue;
                }
                let plan = months.entry(dt.month()).or_insert_with(|| MonthPlan {
                    month: dt.month(),
                    num_tour_starts: 0,
                    tours: Vec::new(),
                });
                plan.num_tour_starts += 1;
                plan.tours.push(name.to_string());
            }
        }

        let mut plan: Vec<MonthPlan> = months.into_values().collect();
        plan.sort_by(|a, b| {
            b.num_tour_starts
                .cmp(&a.num_tour_starts)
                .then(a.month.cmp(&b.month))
        });
        plan.truncate(MONTHLY_PLAN_LIMIT);
        Ok(plan)
    }
}

/// Cap on reported month groups, busiest first.
const MONTHLY_PLAN_LIMIT: usize = 6;

#[derive(Debug)]
struct StatsAccumulator {
    num_tours: usize,
    num_ratings: i64,
    rating_sum: f64,
    price_sum: f64,
    min_price: f64,
    max_price: f64,
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self {
            num_tours: 0,
            num_ratings: 0,
            rating_sum: 0.0,
            price_sum: 0.0,
            min_price: f64::INFINITY,
            max_price: f64::NEG_INFINITY,
        }
    }
}

impl StatsAccumulator {
    fn finish(self, difficulty: String) -> DifficultyStats {
        let n = self.num_tours.max(1) as f64;
        DifficultyStats {
            difficulty,
            num_tours: self.num_tours,
            num_ratings: self.num_ratings,
            avg_rating: self.rating_sum / n,
            avg_price: self.price_sum / n,
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyStats {
    pub difficulty: String,
    pub num_tours: usize,
    pub num_ratings: i64,
    pub avg_rating: f64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthPlan {
    pub month: u32,
    pub num_tour_starts: usize,
    pub tours: Vec<String>,
}

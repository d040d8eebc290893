//! Review operations and their coupling to the owner's rating statistics.
//!
//! Create recomputes with the new review's owner id. Update and delete
//! follow an explicit two-step protocol: the current review is resolved
//! *before* the mutation and its owner id retained, because afterwards the
//! record may be gone or reassigned; the retained id then drives the
//! recompute once the mutation's own result is known. When an update moves
//! a review to another tour, both owners are recomputed.

use std::sync::Arc;

use tracing::info;

use crate::domain::review::{fields, ReviewInput, ReviewPatch};
use crate::domain::{collections, now_millis, ratings::RatingsMaintainer};
use crate::error::{Error, Resource};
use crate::query::exec::{self, FindResult, ReadExecutor};
use crate::query::plan::{FilterExpr, Projection, ReadPlan};
use crate::store::document::{Document, Value};
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct Reviews {
    store: Arc<dyn DocumentStore>,
    executor: ReadExecutor,
    ratings: Arc<RatingsMaintainer>,
}

impl Reviews {
    pub fn new(store: Arc<dyn DocumentStore>, ratings: Arc<RatingsMaintainer>) -> Self {
        let executor = ReadExecutor::new(store.clone());
        Self {
            store,
            executor,
            ratings,
        }
    }

    /// `base` lets the nested route scope the listing to one tour,
    /// independently of user-supplied filters.
    pub async fn find_many(
        &self,
        plan: &ReadPlan,
        base: Option<&FilterExpr>,
    ) -> Result<FindResult, Error> {
        self.executor.execute(collections::REVIEWS, plan, base).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Document, Error> {
        let mut doc = self
            .store
            .get(collections::REVIEWS, id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Review, id))?;
        exec::project(&mut doc, &Projection::DefaultExclude);
        Ok(doc)
    }

    pub async fn create(&self, input: ReviewInput) -> Result<Document, Error> {
        input.validate()?;
        let tour_id = input
            .tour
            .clone()
            .ok_or_else(|| Error::Validation("review must belong to a tour".to_string()))?;
        let user_id = input
            .user
            .clone()
            .ok_or_else(|| Error::Validation("review must belong to a user".to_string()))?;

        self.ensure_tour_exists(&tour_id).await?;
        self.ensure_first_review(&tour_id, &user_id).await?;

        let doc = input.into_document(tour_id.clone(), user_id, now_millis());
        let mut stored = self.store.insert(collections::REVIEWS, doc).await?;
        info!(id = stored.id().unwrap_or_default(), tour = %tour_id, "created review");

        self.ratings.recompute(&tour_id).await?;
        exec::project(&mut stored, &Projection::DefaultExclude);
        Ok(stored)
    }

    pub async fn find_and_update(&self, id: &str, patch: ReviewPatch) -> Result<Document, Error> {
        patch.validate()?;

        // Pre-fetch: retain the current owner before the record changes.
        let current = self
            .store
            .get(collections::REVIEWS, id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Review, id))?;
        let previous_owner = current.text(fields::TOUR)?.to_string();

        if let Some(new_tour) = &patch.tour {
            if *new_tour != previous_owner {
                self.ensure_tour_exists(new_tour).await?;
            }
        }

        let mut updated = self
            .store
            .update(collections::REVIEWS, id, patch.into_patch())
            .await?
            .ok_or_else(|| Error::not_found(Resource::Review, id))?;

        self.ratings.recompute(&previous_owner).await?;
        let new_owner = updated.text(fields::TOUR)?.to_string();
        if new_owner != previous_owner {
            self.ratings.recompute(&new_owner).await?;
        }

        exec::project(&mut updated, &Projection::DefaultExclude);
        Ok(updated)
    }

    pub async fn find_and_delete(&self, id: &str) -> Result<(), Error> {
        // Pre-fetch: after the delete the review is no longer resolvable.
        let current = self
            .store
            .get(collections::REVIEWS, id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Review, id))?;
        let owner = current.text(fields::TOUR)?.to_string();

        self.store.delete(collections::REVIEWS, id).await?;
        info!(id, tour = %owner, "deleted review");

        self.ratings.recompute(&owner).await?;
        Ok(())
    }

    async fn ensure_tour_exists(&self, tour_id: &str) -> Result<(), Error> {
        self.store
            .get(collections::TOURS, tour_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Tour, tour_id))?;
        Ok(())
    }

    /// One review per (tour, user) pair.
    async fn ensure_first_review(&self, tour_id: &str, user_id: &str) -> Result<(), Error> {
        let plan = ReadPlan::unpaged().with_predicate(
            FilterExpr::Eq(
                fields::TOUR.to_string(),
                Value::Text(tour_id.to_string()),
            )
            .and(FilterExpr::Eq(
                fields::USER.to_string(),
                Value::Text(user_id.to_string()),
            )),
        );
        let existing = self.store.find(collections::REVIEWS, &plan, None).await?;
        if existing.matched > 0 {
            return Err(Error::Conflict(
                "user has already reviewed this tour".to_string(),
            ));
        }
        Ok(())
    }
}

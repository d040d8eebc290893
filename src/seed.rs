//! Development-data loading. The store is in-process, so seeding happens at
//! startup from a configured directory instead of through a separate import
//! command; rating stats are recomputed once everything is loaded.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::auth::password;
use crate::domain::ratings::RatingsMaintainer;
use crate::domain::review::fields as review_fields;
use crate::domain::tour::{fields as tour_fields, slugify, Difficulty};
use crate::domain::user::{fields as user_fields, Role};
use crate::domain::{collections, now_millis, ratings};
use crate::error::Error;
use crate::store::document::{Document, Value, ID_FIELD};
use crate::store::DocumentStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedTour {
    #[serde(default)]
    id: Option<String>,
    name: String,
    duration: i64,
    max_group_size: i64,
    difficulty: Difficulty,
    price: f64,
    #[serde(default)]
    price_discount: Option<f64>,
    summary: String,
    #[serde(default)]
    description: Option<String>,
    image_cover: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    start_dates: Vec<DateTime<Utc>>,
    #[serde(default)]
    secret_tour: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedUser {
    #[serde(default)]
    id: Option<String>,
    name: String,
    email: String,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    password: String,
    #[serde(default)]
    active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedReview {
    #[serde(default)]
    id: Option<String>,
    review: String,
    rating: f64,
    tour: String,
    user: String,
}

pub async fn load_dir(
    dir: &Path,
    store: Arc<dyn DocumentStore>,
    ratings: &RatingsMaintainer,
) -> Result<(), Error> {
    let now = now_millis();

    if let Some(tours) = read_file::<SeedTour>(&dir.join("tours.json"))? {
        let count = tours.len();
        for tour in tours {
            store.insert(collections::TOURS, tour.into_document(now)).await?;
        }
        info!(count, "seeded tours");
    }

    if let Some(users) = read_file::<SeedUser>(&dir.join("users.json"))? {
        let count = users.len();
        for user in users {
            let doc = user.into_document(now)?;
            store.insert(collections::USERS, doc).await?;
        }
        info!(count, "seeded users");
    }

    let mut owners: Vec<String> = Vec::new();
    if let Some(reviews) = read_file::<SeedReview>(&dir.join("reviews.json"))? {
        let count = reviews.len();
        for review in reviews {
            if !owners.contains(&review.tour) {
                owners.push(review.tour.clone());
            }
            store
                .insert(collections::REVIEWS, review.into_document(now))
                .await?;
        }
        info!(count, "seeded reviews");
    }

    for owner in owners {
        ratings.recompute(&owner).await?;
    }

    Ok(())
}

fn read_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>, Error> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| Error::Validation(format!("seed file {}: {e}", path.display())))
}

impl SeedTour {
    fn into_document(self, now_ms: i64) -> Document {
        let mut doc = Document::new()
            .with(tour_fields::SLUG, Value::Text(slugify(&self.name)))
            .with(tour_fields::NAME, Value::Text(self.name))
            .with(tour_fields::DURATION, Value::Integer(self.duration))
            .with(
                tour_fields::MAX_GROUP_SIZE,
                Value::Integer(self.max_group_size),
            )
            .with(
                tour_fields::DIFFICULTY,
                Value::Text(self.difficulty.as_str().to_string()),
            )
            .with(
                tour_fields::RATINGS_AVERAGE,
                Value::Float(ratings::DEFAULT_AVERAGE),
            )
            .with(tour_fields::RATINGS_QUANTITY, Value::Integer(0))
            .with(tour_fields::PRICE, Value::Float(self.price))
            .with(tour_fields::SUMMARY, Value::Text(self.summary))
            .with(tour_fields::IMAGE_COVER, Value::Text(self.image_cover))
            .with(
                tour_fields::IMAGES,
                Value::List(self.images.into_iter().map(Value::Text).collect()),
            )
            .with(
                tour_fields::START_DATES,
                Value::List(
                    self.start_dates
                        .into_iter()
                        .map(|dt| Value::Timestamp(dt.timestamp_millis()))
                        .collect(),
                ),
            )
            .with(tour_fields::SECRET_TOUR, Value::Boolean(self.secret_tour))
            .with(tour_fields::CREATED_AT, Value::Timestamp(now_ms));
        if let Some(discount) = self.price_discount {
            doc.set(tour_fields::PRICE_DISCOUNT, Value::Float(discount));
        }
        if let Some(description) = self.description {
            doc.set(tour_fields::DESCRIPTION, Value::Text(description));
        }
        if let Some(id) = self.id {
            doc.set(ID_FIELD, Value::Text(id));
        }
        doc
    }
}

impl SeedUser {
    fn into_document(self, now_ms: i64) -> Result<Document, Error> {
        let role = self.role.unwrap_or(Role::User);
        let mut doc = Document::new()
            .with(user_fields::NAME, Value::Text(self.name))
            .with(user_fields::EMAIL, Value::Text(self.email.to_lowercase()))
            .with(user_fields::ROLE, Value::Text(role.as_str().to_string()))
            .with(
                user_fields::PASSWORD,
                Value::Text(password::hash(&self.password)?),
            )
            .with(
                user_fields::ACTIVE,
                Value::Boolean(self.active.unwrap_or(true)),
            )
            .with(user_fields::CREATED_AT, Value::Timestamp(now_ms));
        if let Some(photo) = self.photo {
            doc.set(user_fields::PHOTO, Value::Text(photo));
        }
        if let Some(id) = self.id {
            doc.set(ID_FIELD, Value::Text(id));
        }
        Ok(doc)
    }
}

impl SeedReview {
    fn into_document(self, now_ms: i64) -> Document {
        let mut doc = Document::new()
            .with(review_fields::REVIEW, Value::Text(self.review))
            .with(review_fields::RATING, Value::Float(self.rating))
            .with(review_fields::TOUR, Value::Text(self.tour))
            .with(review_fields::USER, Value::Text(self.user))
            .with(review_fields::CREATED_AT, Value::Timestamp(now_ms));
        if let Some(id) = self.id {
            doc.set(ID_FIELD, Value::Text(id));
        }
        doc
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ratings, validate};
use crate::error::Error;
use crate::store::document::{Document, Value};

pub mod fields {
    pub const NAME: &str = "name";
    pub const SLUG: &str = "slug";
    pub const DURATION: &str = "duration";
    pub const MAX_GROUP_SIZE: &str = "maxGroupSize";
    pub const DIFFICULTY: &str = "difficulty";
    pub const RATINGS_AVERAGE: &str = "ratingsAverage";
    pub const RATINGS_QUANTITY: &str = "ratingsQuantity";
    pub const PRICE: &str = "price";
    pub const PRICE_DISCOUNT: &str = "priceDiscount";
    pub const SUMMARY: &str = "summary";
    pub const DESCRIPTION: &str = "description";
    pub const IMAGE_COVER: &str = "imageCover";
    pub const IMAGES: &str = "images";
    pub const CREATED_AT: &str = "createdAt";
    pub const START_DATES: &str = "startDates";
    pub const SECRET_TOUR: &str = "secretTour";
}

pub const NAME_MIN_LEN: usize = 10;
pub const NAME_MAX_LEN: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Difficult => "difficult",
        }
    }
}

/// Payload for creating a tour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourInput {
    pub name: String,
    pub duration: i64,
    pub max_group_size: i64,
    pub difficulty: Difficulty,
    pub price: f64,
    #[serde(default)]
    pub price_discount: Option<f64>,
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image_cover: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub start_dates: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub secret_tour: bool,
}

impl TourInput {
    pub fn validate(&self) -> Result<(), Error> {
        validate::length_between(fields::NAME, &self.name, NAME_MIN_LEN, NAME_MAX_LEN)?;
        validate::positive(fields::DURATION, self.duration as f64)?;
        validate::positive(fields::MAX_GROUP_SIZE, self.max_group_size as f64)?;
        validate::positive(fields::PRICE, self.price)?;
        if let Some(discount) = self.price_discount {
            validate::below(fields::PRICE_DISCOUNT, discount, fields::PRICE, self.price)?;
        }
        validate::non_empty(fields::SUMMARY, &self.summary)?;
        validate::non_empty(fields::IMAGE_COVER, &self.image_cover)?;
        Ok(())
    }

    /// Builds the stored form: slug derived from the name, rating stats at
    /// their domain defaults, creation time stamped by the caller.
    pub fn into_document(self, now_ms: i64) -> Document {
        let mut doc = Document::new()
            .with(fields::SLUG, Value::Text(slugify(&self.name)))
            .with(fields::NAME, Value::Text(self.name))
            .with(fields::DURATION, Value::Integer(self.duration))
            .with(fields::MAX_GROUP_SIZE, Value::Integer(self.max_group_size))
            .with(
                fields::DIFFICULTY,
                Value::Text(self.difficulty.as_str().to_string()),
            )
            .with(
                fields::RATINGS_AVERAGE,
                Value::Float(ratings::DEFAULT_AVERAGE),
            )
            .with(fields::RATINGS_QUANTITY, Value::Integer(0))
            .with(fields::PRICE, Value::Float(self.price))
            .with(fields::SUMMARY, Value::Text(self.summary))
            .with(fields::IMAGE_COVER, Value::Text(self.image_cover))
            .with(
                fields::IMAGES,
                Value::List(self.images.into_iter().map(Value::Text).collect()),
            )
            .with(
                fields::START_DATES,
                Value::List(
                    self.start_dates
                        .into_iter()
                        .map(|dt| Value::Timestamp(dt.timestamp_millis()))
                        .collect(),
                ),
            )
            .with(fields::SECRET_TOUR, Value::Boolean(self.secret_tour))
            .with(fields::CREATED_AT, Value::Timestamp(now_ms));
        if let Some(discount) = self.price_discount {
            doc.set(fields::PRICE_DISCOUNT, Value::Float(discount));
        }
        if let Some(description) = self.description {
            doc.set(fields::DESCRIPTION, Value::Text(description));
        }
        doc
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub max_group_size: Option<i64>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub price_discount: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_cover: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    #[serde(default)]
    pub secret_tour: Option<bool>,
}

impl TourPatch {
    /// Field-local checks; the discount/price cross-check needs the current
    /// document and runs in the service.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(name) = &self.name {
            validate::length_between(fields::NAME, name, NAME_MIN_LEN, NAME_MAX_LEN)?;
        }
        if let Some(duration) = self.duration {
            validate::positive(fields::DURATION, duration as f64)?;
        }
        if let Some(size) = self.max_group_size {
            validate::positive(fields::MAX_GROUP_SIZE, size as f64)?;
        }
        if let Some(price) = self.price {
            validate::positive(fields::PRICE, price)?;
        }
        if let Some(summary) = &self.summary {
            validate::non_empty(fields::SUMMARY, summary)?;
        }
        Ok(())
    }

    pub fn into_patch(self) -> Document {
        let mut patch = Document::new();
        if let Some(name) = self.name {
            patch.set(fields::SLUG, Value::Text(slugify(&name)));
            patch.set(fields::NAME, Value::Text(name));
        }
        if let Some(duration) = self.duration {
            patch.set(fields::DURATION, Value::Integer(duration));
        }
        if let Some(size) = self.max_group_size {
            patch.set(fields::MAX_GROUP_SIZE, Value::Integer(size));
        }
        if let Some(difficulty) = self.difficulty {
            patch.set(
                fields::DIFFICULTY,
                Value::Text(difficulty.as_str().to_string()),
            );
        }
        if let Some(price) = self.price {
            patch.set(fields::PRICE, Value::Float(price));
        }
        if let Some(discount) = self.price_discount {
            patch.set(fields::PRICE_DISCOUNT, Value::Float(discount));
        }
        if let Some(summary) = self.summary {
            patch.set(fields::SUMMARY, Value::Text(summary));
        }
        if let Some(description) = self.description {
            patch.set(fields::DESCRIPTION, Value::Text(description));
        }
        if let Some(image_cover) = self.image_cover {
            patch.set(fields::IMAGE_COVER, Value::Text(image_cover));
        }
        if let Some(images) = self.images {
            patch.set(
                fields::IMAGES,
                Value::List(images.into_iter().map(Value::Text).collect()),
            );
        }
        if let Some(dates) = self.start_dates {
            patch.set(
                fields::START_DATES,
                Value::List(
                    dates
                        .into_iter()
                        .map(|dt| Value::Timestamp(dt.timestamp_millis()))
                        .collect(),
                ),
            );
        }
        if let Some(secret) = self.secret_tour {
            patch.set(fields::SECRET_TOUR, Value::Boolean(secret));
        }
        patch
    }
}

/// Lowercased, hyphen-separated form of the name for URL use.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

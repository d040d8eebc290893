use serde::{Deserialize, Serialize};

use crate::domain::validate;
use crate::error::Error;
use crate::store::document::{Document, Value};

pub mod fields {
    pub const REVIEW: &str = "review";
    pub const RATING: &str = "rating";
    pub const CREATED_AT: &str = "createdAt";
    pub const TOUR: &str = "tour";
    pub const USER: &str = "user";
}

pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 5.0;

/// Payload for creating a review. `tour` and `user` may be pre-filled from
/// the nested route and the authenticated caller instead of the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub review: String,
    pub rating: f64,
    #[serde(default)]
    pub tour: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

impl ReviewInput {
    pub fn validate(&self) -> Result<(), Error> {
        validate::non_empty(fields::REVIEW, &self.review)?;
        validate::in_range(fields::RATING, self.rating, RATING_MIN, RATING_MAX)?;
        Ok(())
    }

    pub fn into_document(self, tour_id: String, user_id: String, now_ms: i64) -> Document {
        Document::new()
            .with(fields::REVIEW, Value::Text(self.review))
            .with(fields::RATING, Value::Float(self.rating))
            .with(fields::TOUR, Value::Text(tour_id))
            .with(fields::USER, Value::Text(user_id))
            .with(fields::CREATED_AT, Value::Timestamp(now_ms))
    }
}

/// Partial update. A present `tour` reassigns the review to another owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub tour: Option<String>,
}

impl ReviewPatch {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(review) = &self.review {
            validate::non_empty(fields::REVIEW, review)?;
        }
        if let Some(rating) = self.rating {
            validate::in_range(fields::RATING, rating, RATING_MIN, RATING_MAX)?;
        }
        Ok(())
    }

    pub fn into_patch(self) -> Document {
        let mut patch = Document::new();
        if let Some(review) = self.review {
            patch.set(fields::REVIEW, Value::Text(review));
        }
        if let Some(rating) = self.rating {
            patch.set(fields::RATING, Value::Float(rating));
        }
        if let Some(tour) = self.tour {
            patch.set(fields::TOUR, Value::Text(tour));
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::{ReviewInput, ReviewPatch};

    #[test]
    fn rating_bounds_are_enforced() {
        let mut input = ReviewInput {
            review: "Unforgettable views".to_string(),
            rating: 5.0,
            tour: None,
            user: None,
        };
        assert!(input.validate().is_ok());
        input.rating = 0.5;
        assert!(input.validate().is_err());
        input.rating = 5.5;
        assert!(input.validate().is_err());
    }

    #[test]
    fn empty_review_text_is_rejected() {
        let patch = ReviewPatch {
            review: Some("   ".to_string()),
            ..ReviewPatch::default()
        };
        assert!(patch.validate().is_err());
    }
}

//! Core data types.
//!
//! Field names on the wire follow the backend's camelCase JSON. Records coming
//! from the backend are treated as immutable: a refetch replaces them wholesale.

use crate::tags::TagSet;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

pub type CafeId = i64;
pub type ReviewId = i64;
pub type UserId = i64;

pub const MIN_PRICE: u8 = 1;
pub const MAX_PRICE: u8 = 3;
pub const MAX_RATING: f64 = 5.0;
pub const RATING_STEP: f64 = 0.5;
pub const MAX_COMMENT_LEN: usize = 1000;

/// A single café as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cafe {
    pub cafe_id: CafeId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    /// Price tier 1-3 ("$" to "$$$").
    #[serde(default = "default_price", deserialize_with = "deserialize_price")]
    pub price: u8,
    /// Average review rating; absent until the café has been reviewed.
    #[serde(default)]
    pub overall_rating: Option<f64>,
    /// Raw comma-delimited amenity labels, see [`TagSet::parse`].
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

fn default_price() -> u8 {
    MIN_PRICE
}

// The backend stores price as a double; tiers are whole numbers.
fn deserialize_price<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value
        .filter(|p| p.is_finite())
        .map(|p| p.round().clamp(0.0, f64::from(u8::MAX)) as u8)
        .unwrap_or(MIN_PRICE))
}

impl Cafe {
    pub fn new(cafe_id: CafeId, name: impl Into<String>) -> Self {
        Self {
            cafe_id,
            name: name.into(),
            address: String::new(),
            price: MIN_PRICE,
            overall_rating: None,
            tags: None,
            ai_summary: None,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    pub fn tag_set(&self) -> TagSet {
        TagSet::parse_opt(self.tags.as_deref())
    }

    /// "$", "$$" or "$$$".
    pub fn price_label(&self) -> String {
        "$".repeat(usize::from(self.price.max(MIN_PRICE)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<NaiveDateTime>,
    pub username: String,
    pub user_id: UserId,
}

/// Reviews for one café plus the backend-computed aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CafeReviews {
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub review_count: u64,
}

impl CafeReviews {
    pub fn has_reviewed(&self, user_id: UserId) -> bool {
        self.reviews.iter().any(|r| r.user_id == user_id)
    }
}

/// Payload for submitting a review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReview {
    pub rating: f64,
    pub comment: String,
}

/// Backend acknowledgement for a review mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReceipt {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub review: Option<Review>,
    #[serde(default)]
    pub new_average_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub review_count: Option<u64>,
}

/// A review as shown on a user's profile, carrying the reviewed café.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileReview {
    pub id: ReviewId,
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<NaiveDateTime>,
    pub cafe_id: CafeId,
    pub cafe_name: String,
    #[serde(default)]
    pub cafe_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: UserSummary,
    #[serde(default)]
    pub reviews: Vec<ProfileReview>,
}

/// Registration form as typed by the user, before validation.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

// Timestamps arrive as ISO local date-times; anything else is dropped rather
// than failing the whole record.
fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_str()
            .and_then(|s| s.parse::<NaiveDateTime>().ok())
    }))
}

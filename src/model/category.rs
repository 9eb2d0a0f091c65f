use chrono::{DateTime, Utc};
use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A category that posts can be filed under.
#[model]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Category {
	/// The unique identifier of the category.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The display title of the category.
	#[validate(length(min = 3, max = 50))]
	pub title: String,
	/// The URL-safe identifier derived from the title, unique among categories.
	#[serde(skip_deserializing)]
	pub slug: String,
	/// The creation time of the category.
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Category;

/// The public summary of a post's author.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct Author {
	pub id: Uuid,
	pub name: String,
	pub lastname: Option<String>,
	pub profile_picture: Option<String>,
}

/// A single post, written by a user.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The title of the post.
	#[validate(length(min = 3, max = 50))]
	pub title: String,
	/// The URL-safe identifier derived from the title, unique among posts.
	#[serde(skip_deserializing)]
	pub slug: String,
	/// The content of the post in Markdown format.
	#[validate(length(min = 3))]
	pub content: String,
	/// The user that wrote the post. Never changes after creation.
	#[serde(skip_deserializing)]
	pub author: Author,
	/// The categories the post is filed under.
	#[serde(skip_deserializing)]
	pub categories: Vec<Category>,
	/// The creation time of the post.
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
}

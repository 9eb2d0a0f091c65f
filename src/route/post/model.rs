pub use crate::{
	model::{Category, CreatePostInput, Post, UpdatePostInput},
	route::model::{IdPath, Page, PaginateInput, SlugOrIdPath},
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Either every post, or a single page of them when pagination was requested.
#[derive(Serialize, JsonSchema)]
#[serde(untagged)]
pub enum PostListing {
	All(Vec<Post>),
	Page(Page<Post>),
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct PostCategoryPath {
	/// The id of the post.
	pub id: Uuid,
	pub category_id: Uuid,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct ReplaceCategoriesInput {
	/// The complete set of categories the post should be filed under.
	#[validate(length(max = 100))]
	pub category_ids: Vec<Uuid>,
}

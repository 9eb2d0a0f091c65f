use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Used when only one of `page` and `size` is given.
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginate {
	pub page: i64,
	pub size: i64,
}

impl Paginate {
	pub fn offset(&self) -> i64 {
		(self.page - 1) * self.size
	}

	pub fn limit(&self) -> i64 {
		self.size
	}
}

/// Optional pagination of a listing.
///
/// Without either parameter, the whole listing is returned.
#[derive(Debug, Default, Deserialize, Validate, JsonSchema)]
pub struct PaginateInput {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1, max = 100))]
	pub page: Option<i64>,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100))]
	pub size: Option<i64>,
}

impl PaginateInput {
	pub fn paginate(&self) -> Option<Paginate> {
		match (self.page, self.size) {
			(None, None) => None,
			(page, size) => Some(Paginate {
				page: page.unwrap_or(DEFAULT_PAGE),
				size: size.unwrap_or(DEFAULT_PAGE_SIZE),
			}),
		}
	}
}

/// A single page of a listing.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct Page<T> {
	pub items: Vec<T>,
	/// The number of items across all pages.
	pub total: i64,
	pub page: i64,
	pub size: i64,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct IdPath {
	pub id: Uuid,
}

/// Addresses an entity by either its id or its slug.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct SlugOrIdPath {
	#[validate(length(min = 1, max = 128))]
	pub id: String,
}

impl SlugOrIdPath {
	pub fn as_id(&self) -> Option<Uuid> {
		Uuid::parse_str(&self.id).ok()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_paginate_offset() {
		let mut paginate = Paginate { page: 1, size: 10 };

		assert_eq!(paginate.offset(), 0);

		paginate.page = 2;

		assert_eq!(paginate.offset(), 10);

		paginate.size = 5;

		assert_eq!(paginate.offset(), 5);

		paginate.page = 3;

		assert_eq!(paginate.offset(), 10);
	}

	#[test]
	fn test_paginate_limit() {
		let paginate = Paginate { page: 1, size: 10 };

		assert_eq!(paginate.limit(), 10);
	}

	#[test]
	fn test_paginate_input() {
		assert_eq!(PaginateInput::default().paginate(), None);

		let input = PaginateInput {
			page: Some(3),
			size: None,
		};
		assert_eq!(input.paginate(), Some(Paginate { page: 3, size: 10 }));

		let input = PaginateInput {
			page: None,
			size: Some(25),
		};
		assert_eq!(input.paginate(), Some(Paginate { page: 1, size: 25 }));
	}

	#[test]
	fn test_slug_or_id() {
		let id = Uuid::new_v4();

		assert_eq!(SlugOrIdPath { id: id.to_string() }.as_id(), Some(id));
		assert_eq!(SlugOrIdPath { id: "hello-world".into() }.as_id(), None);
	}
}

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{derive_slug, Error, Result};
use crate::{
	model::{Category, CreateCategoryInput, UpdateCategoryInput},
	Database,
};

const ENTITY: &str = "category";
const TABLE: &str = "categories";

#[async_trait]
pub trait CategoryRepository: Send + Sync {
	async fn find_all(&self) -> Result<Vec<Category>>;

	async fn find_by_id(&self, id: Uuid) -> Result<Category>;

	async fn find_by_slug(&self, slug: &str) -> Result<Category>;

	async fn create(&self, input: CreateCategoryInput) -> Result<Category>;

	/// Updates the title, re-deriving the slug only when the title actually changes.
	async fn update(&self, id: Uuid, input: UpdateCategoryInput) -> Result<Category>;

	async fn delete(&self, id: Uuid) -> Result<()>;
}

pub struct SqliteCategoryRepository {
	database: Database,
}

impl SqliteCategoryRepository {
	pub fn new(database: Database) -> Self {
		Self { database }
	}
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
	async fn find_all(&self) -> Result<Vec<Category>> {
		let categories =
			sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY title, id")
				.fetch_all(&self.database)
				.await?;

		Ok(categories)
	}

	async fn find_by_id(&self, id: Uuid) -> Result<Category> {
		sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.database)
			.await?
			.ok_or_else(|| Error::not_found(ENTITY, id))
	}

	async fn find_by_slug(&self, slug: &str) -> Result<Category> {
		sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
			.bind(slug)
			.fetch_optional(&self.database)
			.await?
			.ok_or_else(|| Error::not_found(ENTITY, slug))
	}

	async fn create(&self, input: CreateCategoryInput) -> Result<Category> {
		let slug = derive_slug(&self.database, TABLE, &input.title, None).await?;

		let category = sqlx::query_as::<_, Category>(
			r#"
				INSERT INTO categories (id, title, slug, created_at)
				VALUES ($1, $2, $3, $4)
				RETURNING *
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(input.title)
		.bind(slug)
		.bind(Utc::now())
		.fetch_one(&self.database)
		.await?;

		Ok(category)
	}

	async fn update(&self, id: Uuid, input: UpdateCategoryInput) -> Result<Category> {
		let existing = self.find_by_id(id).await?;

		let Some(title) = input.title.filter(|title| *title != existing.title) else {
			return Ok(existing);
		};

		let slug = derive_slug(&self.database, TABLE, &title, Some(id)).await?;

		sqlx::query_as::<_, Category>(
			r#"
				UPDATE categories
				SET title = $1, slug = $2
				WHERE id = $3
				RETURNING *
			"#,
		)
		.bind(title)
		.bind(slug)
		.bind(id)
		.fetch_optional(&self.database)
		.await?
		.ok_or_else(|| Error::not_found(ENTITY, id))
	}

	async fn delete(&self, id: Uuid) -> Result<()> {
		let result = sqlx::query("DELETE FROM categories WHERE id = $1")
			.bind(id)
			.execute(&self.database)
			.await?;

		if result.rows_affected() == 0 {
			return Err(Error::not_found(ENTITY, id));
		}

		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn input(title: &str) -> CreateCategoryInput {
		CreateCategoryInput {
			title: title.into(),
		}
	}

	#[sqlx::test]
	async fn test_slug_collisions(pool: Database) {
		let categories = SqliteCategoryRepository::new(pool);

		let first = categories.create(input("Rust Tips")).await.unwrap();
		let second = categories.create(input("rust tips!")).await.unwrap();
		let third = categories.create(input("Rust -- Tips")).await.unwrap();

		assert_eq!(first.slug, "rust-tips");
		assert_eq!(second.slug, "rust-tips-1");
		assert_eq!(third.slug, "rust-tips-2");
		assert_eq!(
			categories.find_by_slug("rust-tips-1").await.unwrap().id,
			second.id
		);
	}

	#[sqlx::test]
	async fn test_empty_slug_rejected(pool: Database) {
		let categories = SqliteCategoryRepository::new(pool);

		let result = categories.create(input("???")).await;

		assert!(matches!(result, Err(Error::Validation(..))));
	}

	#[sqlx::test]
	async fn test_update_same_title_keeps_slug(pool: Database) {
		let categories = SqliteCategoryRepository::new(pool);
		let category = categories.create(input("News")).await.unwrap();

		let updated = categories
			.update(
				category.id,
				UpdateCategoryInput {
					title: Some("News".into()),
				},
			)
			.await
			.unwrap();

		assert_eq!(updated.slug, "news");
	}

	#[sqlx::test]
	async fn test_update_excludes_itself(pool: Database) {
		let categories = SqliteCategoryRepository::new(pool);
		let category = categories.create(input("News")).await.unwrap();

		// same base slug, different title
		let updated = categories
			.update(
				category.id,
				UpdateCategoryInput {
					title: Some("NEWS!".into()),
				},
			)
			.await
			.unwrap();

		assert_eq!(updated.title, "NEWS!");
		assert_eq!(updated.slug, "news");
	}

	#[sqlx::test]
	async fn test_update_rederives_slug(pool: Database) {
		let categories = SqliteCategoryRepository::new(pool);
		categories.create(input("Guides")).await.unwrap();
		let category = categories.create(input("News")).await.unwrap();

		let updated = categories
			.update(
				category.id,
				UpdateCategoryInput {
					title: Some("Guides".into()),
				},
			)
			.await
			.unwrap();

		assert_eq!(updated.slug, "guides-1");
	}

	#[sqlx::test]
	async fn test_update_unknown(pool: Database) {
		let categories = SqliteCategoryRepository::new(pool);

		let result = categories
			.update(Uuid::new_v4(), UpdateCategoryInput { title: None })
			.await;

		assert!(matches!(result, Err(Error::NotFound { .. })));
	}

	#[sqlx::test]
	async fn test_delete_unknown(pool: Database) {
		let categories = SqliteCategoryRepository::new(pool);
		let category = categories.create(input("News")).await.unwrap();

		categories.delete(category.id).await.unwrap();

		assert!(matches!(
			categories.delete(category.id).await,
			Err(Error::NotFound { entity: "category", .. })
		));
	}

	#[sqlx::test]
	async fn test_slug_race_conflicts(pool: Database) {
		let categories = SqliteCategoryRepository::new(pool.clone());
		let existing = categories.create(input("Rust")).await.unwrap();

		// A writer that checked the slug before `existing` was inserted
		let result = sqlx::query(
			"INSERT INTO categories (id, title, slug, created_at) VALUES ($1, $2, $3, $4)",
		)
		.bind(Uuid::new_v4())
		.bind("Rust")
		.bind(&existing.slug)
		.bind(Utc::now())
		.execute(&pool)
		.await
		.map_err(Error::from);

		assert!(matches!(result, Err(Error::Conflict(..))));
		assert_eq!(categories.find_all().await.unwrap().len(), 1);
		assert_eq!(
			categories.create(input("Rust")).await.unwrap().slug,
			"rust-1"
		);
	}
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use super::{derive_slug, Error, Result};
use crate::{
	model::{Author, Category, CreatePostInput, Post, UpdatePostInput},
	Database,
};

const ENTITY: &str = "post";
const TABLE: &str = "posts";

const SELECT_POSTS: &str = r#"
	SELECT
		posts.id, posts.title, posts.slug, posts.content, posts.created_at,
		users.id AS author_id,
		users.name AS author_name,
		users.lastname AS author_lastname,
		users.profile_picture AS author_picture
	FROM posts
	INNER JOIN users ON users.id = posts.user_id
"#;

#[async_trait]
pub trait PostRepository: Send + Sync {
	/// Returns every post, newest first.
	async fn find_all(&self) -> Result<Vec<Post>>;

	/// Returns one page of posts, newest first, along with the total number of posts.
	async fn find_page(&self, limit: i64, offset: i64) -> Result<(Vec<Post>, i64)>;

	async fn find_by_id(&self, id: Uuid) -> Result<Post>;

	async fn find_by_slug(&self, slug: &str) -> Result<Post>;

	async fn create(&self, author_id: Uuid, input: CreatePostInput) -> Result<Post>;

	/// Updates the title and content. The author never changes, and the slug is
	/// only re-derived when the title does.
	async fn update(&self, id: Uuid, input: UpdatePostInput) -> Result<Post>;

	async fn delete(&self, id: Uuid) -> Result<()>;

	/// Links a category to a post. Linking the same pair twice is a [`Error::Conflict`].
	async fn assign_category(&self, post_id: Uuid, category_id: Uuid) -> Result<()>;

	/// Unlinks a category from a post. Unlinking a pair that is not linked succeeds.
	async fn unassign_category(&self, post_id: Uuid, category_id: Uuid) -> Result<()>;

	async fn categories_for_post(&self, post_id: Uuid) -> Result<Vec<Category>>;

	/// Replaces every category of a post in one transaction.
	///
	/// Either all of `category_ids` end up linked, or the previous links are left untouched.
	async fn replace_categories(&self, post_id: Uuid, category_ids: &[Uuid]) -> Result<()>;
}

#[derive(sqlx::FromRow)]
struct PostRow {
	id: Uuid,
	title: String,
	slug: String,
	content: String,
	created_at: DateTime<Utc>,
	author_id: Uuid,
	author_name: String,
	author_lastname: Option<String>,
	author_picture: Option<String>,
}

impl PostRow {
	fn into_post(self, categories: Vec<Category>) -> Post {
		Post {
			id: self.id,
			title: self.title,
			slug: self.slug,
			content: self.content,
			author: Author {
				id: self.author_id,
				name: self.author_name,
				lastname: self.author_lastname,
				profile_picture: self.author_picture,
			},
			categories,
			created_at: self.created_at,
		}
	}
}

#[derive(sqlx::FromRow)]
struct CategoryLink {
	post_id: Uuid,
	#[sqlx(flatten)]
	category: Category,
}

pub struct SqlitePostRepository {
	database: Database,
}

impl SqlitePostRepository {
	pub fn new(database: Database) -> Self {
		Self { database }
	}

	/// Loads the categories of every row in one query and attaches them.
	async fn with_categories(&self, rows: Vec<PostRow>) -> Result<Vec<Post>> {
		if rows.is_empty() {
			return Ok(Vec::new());
		}

		let mut builder = QueryBuilder::<Sqlite>::new(
			r#"
				SELECT post_categories.post_id, categories.*
				FROM post_categories
				INNER JOIN categories ON categories.id = post_categories.category_id
				WHERE post_categories.post_id IN (
			"#,
		);

		let mut ids = builder.separated(", ");
		for row in &rows {
			ids.push_bind(row.id);
		}
		ids.push_unseparated(") ORDER BY categories.title");

		let links = builder
			.build_query_as::<CategoryLink>()
			.fetch_all(&self.database)
			.await?;

		let mut categories: HashMap<Uuid, Vec<Category>> = HashMap::new();
		for link in links {
			categories.entry(link.post_id).or_default().push(link.category);
		}

		Ok(rows
			.into_iter()
			.map(|row| {
				let linked = categories.remove(&row.id).unwrap_or_default();
				row.into_post(linked)
			})
			.collect())
	}

	async fn find_one(&self, filter: &str, key: &str) -> Result<Option<Post>> {
		let row = sqlx::query_as::<_, PostRow>(&format!("{SELECT_POSTS} WHERE {filter}"))
			.bind(key)
			.fetch_optional(&self.database)
			.await?;

		match row {
			Some(row) => {
				let categories = self.categories_for_post(row.id).await?;
				Ok(Some(row.into_post(categories)))
			}
			None => Ok(None),
		}
	}
}

async fn replace_in(
	connection: &mut SqliteConnection,
	post_id: Uuid,
	category_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
	sqlx::query("DELETE FROM post_categories WHERE post_id = $1")
		.bind(post_id)
		.execute(&mut *connection)
		.await?;

	for category_id in category_ids {
		sqlx::query("INSERT INTO post_categories (post_id, category_id) VALUES ($1, $2)")
			.bind(post_id)
			.bind(category_id)
			.execute(&mut *connection)
			.await?;
	}

	Ok(())
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
	async fn find_all(&self) -> Result<Vec<Post>> {
		let rows = sqlx::query_as::<_, PostRow>(&format!(
			"{SELECT_POSTS} ORDER BY posts.created_at DESC, posts.id"
		))
		.fetch_all(&self.database)
		.await?;

		self.with_categories(rows).await
	}

	async fn find_page(&self, limit: i64, offset: i64) -> Result<(Vec<Post>, i64)> {
		let rows = sqlx::query_as::<_, PostRow>(&format!(
			"{SELECT_POSTS} ORDER BY posts.created_at DESC, posts.id LIMIT $1 OFFSET $2"
		))
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.database)
		.await?;

		let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
			.fetch_one(&self.database)
			.await?;

		Ok((self.with_categories(rows).await?, total))
	}

	async fn find_by_id(&self, id: Uuid) -> Result<Post> {
		let row = sqlx::query_as::<_, PostRow>(&format!("{SELECT_POSTS} WHERE posts.id = $1"))
			.bind(id)
			.fetch_optional(&self.database)
			.await?
			.ok_or_else(|| Error::not_found(ENTITY, id))?;

		let categories = self.categories_for_post(id).await?;
		Ok(row.into_post(categories))
	}

	async fn find_by_slug(&self, slug: &str) -> Result<Post> {
		self.find_one("posts.slug = $1", slug)
			.await?
			.ok_or_else(|| Error::not_found(ENTITY, slug))
	}

	async fn create(&self, author_id: Uuid, input: CreatePostInput) -> Result<Post> {
		let slug = derive_slug(&self.database, TABLE, &input.title, None).await?;
		let id = Uuid::new_v4();

		sqlx::query(
			r#"
				INSERT INTO posts (id, title, slug, content, user_id, created_at)
				VALUES ($1, $2, $3, $4, $5, $6)
			"#,
		)
		.bind(id)
		.bind(input.title)
		.bind(slug)
		.bind(input.content)
		.bind(author_id)
		.bind(Utc::now())
		.execute(&self.database)
		.await
		.map_err(|error| match error {
			sqlx::Error::Database(ref database) if database.is_foreign_key_violation() => {
				Error::not_found("user", author_id)
			}
			error => error.into(),
		})?;

		self.find_by_id(id).await
	}

	async fn update(&self, id: Uuid, input: UpdatePostInput) -> Result<Post> {
		let existing = self.find_by_id(id).await?;

		let slug = match input.title.as_deref() {
			Some(title) if title != existing.title => {
				derive_slug(&self.database, TABLE, title, Some(id)).await?
			}
			_ => existing.slug,
		};
		let title = input.title.unwrap_or(existing.title);
		let content = input.content.unwrap_or(existing.content);

		let result = sqlx::query("UPDATE posts SET title = $1, slug = $2, content = $3 WHERE id = $4")
			.bind(title)
			.bind(slug)
			.bind(content)
			.bind(id)
			.execute(&self.database)
			.await?;

		if result.rows_affected() == 0 {
			return Err(Error::not_found(ENTITY, id));
		}

		self.find_by_id(id).await
	}

	async fn delete(&self, id: Uuid) -> Result<()> {
		let result = sqlx::query("DELETE FROM posts WHERE id = $1")
			.bind(id)
			.execute(&self.database)
			.await?;

		if result.rows_affected() == 0 {
			return Err(Error::not_found(ENTITY, id));
		}

		Ok(())
	}

	async fn assign_category(&self, post_id: Uuid, category_id: Uuid) -> Result<()> {
		sqlx::query("INSERT INTO post_categories (post_id, category_id) VALUES ($1, $2)")
			.bind(post_id)
			.bind(category_id)
			.execute(&self.database)
			.await?;

		Ok(())
	}

	async fn unassign_category(&self, post_id: Uuid, category_id: Uuid) -> Result<()> {
		sqlx::query("DELETE FROM post_categories WHERE post_id = $1 AND category_id = $2")
			.bind(post_id)
			.bind(category_id)
			.execute(&self.database)
			.await?;

		Ok(())
	}

	async fn categories_for_post(&self, post_id: Uuid) -> Result<Vec<Category>> {
		let categories = sqlx::query_as::<_, Category>(
			r#"
				SELECT categories.*
				FROM categories
				INNER JOIN post_categories ON post_categories.category_id = categories.id
				WHERE post_categories.post_id = $1
				ORDER BY categories.title
			"#,
		)
		.bind(post_id)
		.fetch_all(&self.database)
		.await?;

		Ok(categories)
	}

	async fn replace_categories(&self, post_id: Uuid, category_ids: &[Uuid]) -> Result<()> {
		let mut tx = self.database.begin().await?;

		if let Err(error) = replace_in(&mut *tx, post_id, category_ids).await {
			if let Err(rollback) = tx.rollback().await {
				tracing::warn!(?rollback, %post_id, "failed to roll back category replacement");
			}

			return Err(error.into());
		}

		tx.commit().await?;
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		model::{CreateCategoryInput, NewUser},
		repository::{
			CategoryRepository, SqliteCategoryRepository, SqliteUserRepository, UserRepository,
		},
	};

	struct Fixture {
		posts: SqlitePostRepository,
		categories: SqliteCategoryRepository,
		author: Uuid,
	}

	async fn fixture(pool: Database) -> Fixture {
		let users = SqliteUserRepository::new(pool.clone());
		let author = users
			.create(NewUser {
				name: "Ada".into(),
				email: "ada@example.com".into(),
				password: Some("$argon2id$placeholder".into()),
				..NewUser::default()
			})
			.await
			.unwrap();

		Fixture {
			posts: SqlitePostRepository::new(pool.clone()),
			categories: SqliteCategoryRepository::new(pool),
			author: author.id,
		}
	}

	fn post(title: &str) -> CreatePostInput {
		CreatePostInput {
			title: title.into(),
			content: "Some content".into(),
		}
	}

	async fn category(fixture: &Fixture, title: &str) -> Uuid {
		fixture
			.categories
			.create(CreateCategoryInput {
				title: title.into(),
			})
			.await
			.unwrap()
			.id
	}

	fn ids(categories: &[Category]) -> Vec<Uuid> {
		let mut ids = categories.iter().map(|c| c.id).collect::<Vec<_>>();
		ids.sort();
		ids
	}

	#[sqlx::test]
	async fn test_create_derives_unique_slugs(pool: Database) {
		let fixture = fixture(pool).await;

		let first = fixture.posts.create(fixture.author, post("Hello, World! 2024")).await.unwrap();
		let second = fixture.posts.create(fixture.author, post("hello world 2024")).await.unwrap();

		assert_eq!(first.slug, "hello-world-2024");
		assert_eq!(second.slug, "hello-world-2024-1");
		assert_eq!(first.author.id, fixture.author);
		assert_eq!(first.author.name, "Ada");
		assert_eq!(
			fixture.posts.find_by_slug("hello-world-2024-1").await.unwrap().id,
			second.id
		);
	}

	#[sqlx::test]
	async fn test_create_unknown_author(pool: Database) {
		let fixture = fixture(pool).await;

		let result = fixture.posts.create(Uuid::new_v4(), post("Orphan")).await;

		assert!(matches!(result, Err(Error::NotFound { entity: "user", .. })));
	}

	#[sqlx::test]
	async fn test_create_empty_slug_rejected(pool: Database) {
		let fixture = fixture(pool).await;

		let result = fixture.posts.create(fixture.author, post("!!!")).await;

		assert!(matches!(result, Err(Error::Validation(..))));
	}

	#[sqlx::test]
	async fn test_update_without_title_keeps_slug(pool: Database) {
		let fixture = fixture(pool).await;
		fixture.posts.create(fixture.author, post("Intro")).await.unwrap();
		let second = fixture.posts.create(fixture.author, post("Intro")).await.unwrap();
		assert_eq!(second.slug, "intro-1");

		let updated = fixture
			.posts
			.update(
				second.id,
				UpdatePostInput {
					title: Some("Intro".into()),
					content: Some("Rewritten".into()),
				},
			)
			.await
			.unwrap();

		assert_eq!(updated.slug, "intro-1");
		assert_eq!(updated.content, "Rewritten");
		assert_eq!(updated.author.id, fixture.author);
	}

	#[sqlx::test]
	async fn test_update_new_title(pool: Database) {
		let fixture = fixture(pool).await;
		let created = fixture.posts.create(fixture.author, post("Draft")).await.unwrap();

		let updated = fixture
			.posts
			.update(
				created.id,
				UpdatePostInput {
					title: Some("Final Version".into()),
					content: None,
				},
			)
			.await
			.unwrap();

		assert_eq!(updated.slug, "final-version");
		assert_eq!(updated.content, "Some content");
	}

	#[sqlx::test]
	async fn test_delete_unknown(pool: Database) {
		let fixture = fixture(pool).await;

		let result = fixture.posts.delete(Uuid::new_v4()).await;

		assert!(matches!(result, Err(Error::NotFound { entity: "post", .. })));
	}

	#[sqlx::test]
	async fn test_pagination(pool: Database) {
		let fixture = fixture(pool).await;
		for index in 0..5 {
			fixture
				.posts
				.create(fixture.author, post(&format!("Post {index}")))
				.await
				.unwrap();
		}

		let (page, total) = fixture.posts.find_page(2, 4).await.unwrap();

		assert_eq!(total, 5);
		assert_eq!(page.len(), 1);
		assert_eq!(fixture.posts.find_all().await.unwrap().len(), 5);
	}

	#[sqlx::test]
	async fn test_assign_and_list(pool: Database) {
		let fixture = fixture(pool).await;
		let created = fixture.posts.create(fixture.author, post("Tagged")).await.unwrap();
		let rust = category(&fixture, "Rust").await;
		let web = category(&fixture, "Web").await;

		fixture.posts.assign_category(created.id, rust).await.unwrap();
		fixture.posts.assign_category(created.id, web).await.unwrap();

		let linked = fixture.posts.categories_for_post(created.id).await.unwrap();
		let mut expected = vec![rust, web];
		expected.sort();
		assert_eq!(ids(&linked), expected);

		let found = fixture.posts.find_by_id(created.id).await.unwrap();
		assert_eq!(found.categories.len(), 2);

		let all = fixture.posts.find_all().await.unwrap();
		assert_eq!(all[0].categories.len(), 2);
	}

	#[sqlx::test]
	async fn test_assign_twice_fails(pool: Database) {
		let fixture = fixture(pool).await;
		let created = fixture.posts.create(fixture.author, post("Tagged")).await.unwrap();
		let rust = category(&fixture, "Rust").await;

		fixture.posts.assign_category(created.id, rust).await.unwrap();

		assert!(fixture.posts.assign_category(created.id, rust).await.is_err());
	}

	#[sqlx::test]
	async fn test_unassign_is_idempotent(pool: Database) {
		let fixture = fixture(pool).await;
		let created = fixture.posts.create(fixture.author, post("Tagged")).await.unwrap();
		let rust = category(&fixture, "Rust").await;
		fixture.posts.assign_category(created.id, rust).await.unwrap();

		fixture.posts.unassign_category(created.id, rust).await.unwrap();
		fixture.posts.unassign_category(created.id, rust).await.unwrap();

		assert!(fixture.posts.categories_for_post(created.id).await.unwrap().is_empty());
	}

	#[sqlx::test]
	async fn test_replace_categories(pool: Database) {
		let fixture = fixture(pool).await;
		let created = fixture.posts.create(fixture.author, post("Tagged")).await.unwrap();
		let c1 = category(&fixture, "One").await;
		let c2 = category(&fixture, "Two").await;
		let c3 = category(&fixture, "Three").await;
		fixture.posts.assign_category(created.id, c1).await.unwrap();

		fixture
			.posts
			.replace_categories(created.id, &[c2, c3])
			.await
			.unwrap();

		let mut expected = vec![c2, c3];
		expected.sort();
		assert_eq!(
			ids(&fixture.posts.categories_for_post(created.id).await.unwrap()),
			expected
		);

		fixture.posts.replace_categories(created.id, &[]).await.unwrap();
		assert!(fixture.posts.categories_for_post(created.id).await.unwrap().is_empty());
	}

	#[sqlx::test]
	async fn test_replace_rolls_back_on_dangling_category(pool: Database) {
		let fixture = fixture(pool).await;
		let created = fixture.posts.create(fixture.author, post("Tagged")).await.unwrap();
		let c1 = category(&fixture, "One").await;
		let c2 = category(&fixture, "Two").await;
		fixture.posts.assign_category(created.id, c1).await.unwrap();

		let result = fixture
			.posts
			.replace_categories(created.id, &[c2, Uuid::new_v4()])
			.await;

		assert!(result.is_err());
		assert_eq!(
			ids(&fixture.posts.categories_for_post(created.id).await.unwrap()),
			vec![c1]
		);
	}

	#[sqlx::test]
	async fn test_replace_rolls_back_on_duplicate_input(pool: Database) {
		let fixture = fixture(pool).await;
		let created = fixture.posts.create(fixture.author, post("Tagged")).await.unwrap();
		let c1 = category(&fixture, "One").await;
		let c2 = category(&fixture, "Two").await;
		fixture.posts.assign_category(created.id, c1).await.unwrap();

		let result = fixture
			.posts
			.replace_categories(created.id, &[c2, c2])
			.await;

		assert!(result.is_err());
		assert_eq!(
			ids(&fixture.posts.categories_for_post(created.id).await.unwrap()),
			vec![c1]
		);
	}

	#[sqlx::test]
	async fn test_delete_post_removes_links(pool: Database) {
		let fixture = fixture(pool.clone()).await;
		let created = fixture.posts.create(fixture.author, post("Tagged")).await.unwrap();
		let c1 = category(&fixture, "One").await;
		fixture.posts.assign_category(created.id, c1).await.unwrap();

		fixture.posts.delete(created.id).await.unwrap();

		let links = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post_categories")
			.fetch_one(&pool)
			.await
			.unwrap();
		assert_eq!(links, 0);
	}
}

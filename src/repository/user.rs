use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{Error, Result};
use crate::{
	model::{NewUser, User, UserChanges},
	Database,
};

const ENTITY: &str = "user";

#[async_trait]
pub trait UserRepository: Send + Sync {
	async fn find_all(&self) -> Result<Vec<User>>;

	async fn find_by_id(&self, id: Uuid) -> Result<User>;

	async fn find_by_email(&self, email: &str) -> Result<User>;

	/// Stores a new user. An email that is already registered is a [`Error::Conflict`].
	async fn create(&self, user: NewUser) -> Result<User>;

	/// Applies a partial update. Switching the provider away from `local` drops the password hash.
	async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User>;

	async fn delete(&self, id: Uuid) -> Result<()>;
}

pub struct SqliteUserRepository {
	database: Database,
}

impl SqliteUserRepository {
	pub fn new(database: Database) -> Self {
		Self { database }
	}
}

fn email_conflict(error: sqlx::Error) -> Error {
	match Error::from(error) {
		Error::Conflict(..) => Error::Conflict("email already taken".into()),
		error => error,
	}
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
	async fn find_all(&self) -> Result<Vec<User>> {
		let users = sqlx::query_as::<_, User>(
			r#"
				SELECT * FROM users
				ORDER BY created_at DESC
			"#,
		)
		.fetch_all(&self.database)
		.await?;

		Ok(users)
	}

	async fn find_by_id(&self, id: Uuid) -> Result<User> {
		sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.database)
			.await?
			.ok_or_else(|| Error::not_found(ENTITY, id))
	}

	async fn find_by_email(&self, email: &str) -> Result<User> {
		sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
			.bind(email)
			.fetch_optional(&self.database)
			.await?
			.ok_or_else(|| Error::not_found(ENTITY, email))
	}

	async fn create(&self, user: NewUser) -> Result<User> {
		let now = Utc::now();

		sqlx::query_as::<_, User>(
			r#"
				INSERT INTO users (
					id, name, lastname, email, password, google_id,
					profile_picture, auth_provider, created_at, updated_at
				)
				VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
				RETURNING *
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(user.name)
		.bind(user.lastname)
		.bind(user.email)
		.bind(user.password)
		.bind(user.google_id)
		.bind(user.profile_picture)
		.bind(user.auth_provider)
		.bind(now)
		.fetch_one(&self.database)
		.await
		.map_err(email_conflict)
	}

	async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User> {
		sqlx::query_as::<_, User>(
			r#"
				UPDATE users
				SET
					name = COALESCE($1, name),
					lastname = COALESCE($2, lastname),
					email = COALESCE($3, email),
					google_id = COALESCE($4, google_id),
					profile_picture = COALESCE($5, profile_picture),
					auth_provider = COALESCE($6, auth_provider),
					password = CASE WHEN COALESCE($6, auth_provider) = 'local' THEN password ELSE NULL END,
					updated_at = $7
				WHERE id = $8
				RETURNING *
			"#,
		)
		.bind(changes.name)
		.bind(changes.lastname)
		.bind(changes.email)
		.bind(changes.google_id)
		.bind(changes.profile_picture)
		.bind(changes.auth_provider)
		.bind(Utc::now())
		.bind(id)
		.fetch_optional(&self.database)
		.await
		.map_err(email_conflict)?
		.ok_or_else(|| Error::not_found(ENTITY, id))
	}

	async fn delete(&self, id: Uuid) -> Result<()> {
		let result = sqlx::query("DELETE FROM users WHERE id = $1")
			.bind(id)
			.execute(&self.database)
			.await?;

		if result.rows_affected() == 0 {
			return Err(Error::not_found(ENTITY, id));
		}

		Ok(())
	}
}

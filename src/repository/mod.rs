pub mod category;
pub mod post;
pub mod user;

use std::{borrow::Cow, str::FromStr, sync::Arc};

use axum::http::StatusCode;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use uuid::Uuid;

pub use category::{CategoryRepository, SqliteCategoryRepository};
pub use post::{PostRepository, SqlitePostRepository};
pub use user::{SqliteUserRepository, UserRepository};

use crate::{error::Message, slug, Database};

pub type UserStore = Arc<dyn UserRepository>;
pub type PostStore = Arc<dyn PostRepository>;
pub type CategoryStore = Arc<dyn CategoryRepository>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error returned by a repository.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A point lookup found nothing, or an update or delete affected no rows.
	#[error("{entity} not found")]
	NotFound { entity: &'static str, key: String },
	/// A unique constraint rejected the write.
	#[error("{0}")]
	Conflict(Cow<'static, str>),
	/// The input was rejected before it reached storage.
	#[error("{0}")]
	Validation(Cow<'static, str>),
	/// Any other storage failure.
	#[error("storage unavailable: {0}")]
	Storage(#[source] sqlx::Error),
}

impl From<sqlx::Error> for Error {
	fn from(error: sqlx::Error) -> Self {
		match error {
			sqlx::Error::Database(ref database) if database.is_unique_violation() => {
				Self::Conflict(database.message().to_owned().into())
			}
			error => Self::Storage(error),
		}
	}
}

impl Error {
	pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
		Self::NotFound {
			entity,
			key: key.to_string(),
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Self::NotFound { .. } => StatusCode::NOT_FOUND,
			Self::Conflict(..) | Self::Validation(..) => StatusCode::BAD_REQUEST,
			Self::Storage(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn into_message(self) -> Message {
		match self {
			Self::NotFound { entity, key } => {
				Message::new(format!("{entity} not found")).detail(entity, key)
			}
			Self::Conflict(content) | Self::Validation(content) => Message::new(content),
			Self::Storage(..) => Message::new("internal server error"),
		}
	}
}

/// Opens a connection pool, creating the database file if needed.
pub async fn connect(url: &str) -> Result<Database, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(url)?
		.create_if_missing(true)
		.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(8)
		.connect_with(options)
		.await
}

/// Derives a slug for `title` that no row of `table` other than `exclude` uses.
///
/// Titles without a single ASCII letter or digit are rejected.
async fn derive_slug(
	database: &Database,
	table: &'static str,
	title: &str,
	exclude: Option<Uuid>,
) -> Result<String> {
	let base = slug::slugify(title);

	if base.is_empty() {
		return Err(Error::Validation(
			"title must contain at least one letter or digit".into(),
		));
	}

	let query =
		format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE slug = $1 AND ($2 IS NULL OR id != $2))");

	slug::unique(&base, |candidate| {
		let query = query.as_str();

		async move {
			sqlx::query_scalar::<_, bool>(query)
				.bind(candidate)
				.bind(exclude)
				.fetch_one(database)
				.await
				.map_err(Error::from)
		}
	})
	.await
}

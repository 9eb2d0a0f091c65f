use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// How a user authenticates.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AuthProvider {
	#[default]
	Local,
	Google,
}

/// A single user.
///
/// Local users always have a password hash; users created through Google never do.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The name that is displayed to the public.
	pub name: String,
	pub lastname: Option<String>,
	/// The user's email address, used for logging in.
	pub email: String,
	/// The argon2 password hash in PHC format.
	#[serde(skip)]
	pub password: Option<String>,
	/// The subject id assigned by Google.
	#[serde(skip)]
	pub google_id: Option<String>,
	pub profile_picture: Option<String>,
	pub auth_provider: AuthProvider,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A user about to be stored. The password, if any, is already hashed.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
	pub name: String,
	pub lastname: Option<String>,
	pub email: String,
	pub password: Option<String>,
	pub google_id: Option<String>,
	pub profile_picture: Option<String>,
	pub auth_provider: AuthProvider,
}

/// A partial update of a user. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
	pub name: Option<String>,
	pub lastname: Option<String>,
	pub email: Option<String>,
	pub google_id: Option<String>,
	pub profile_picture: Option<String>,
	pub auth_provider: Option<AuthProvider>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct RegisterInput {
	/// The name that is displayed to the public.
	#[validate(length(min = 1, max = 50))]
	pub name: String,
	#[validate(length(max = 50))]
	pub lastname: Option<String>,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate, JsonSchema)]
pub struct UpdateUserInput {
	#[validate(length(min = 1, max = 50))]
	pub name: Option<String>,
	#[validate(length(max = 50))]
	pub lastname: Option<String>,
	#[validate(email)]
	pub email: Option<String>,
}

impl From<UpdateUserInput> for UserChanges {
	fn from(input: UpdateUserInput) -> Self {
		Self {
			name: input.name,
			lastname: input.lastname,
			email: input.email,
			..Self::default()
		}
	}
}

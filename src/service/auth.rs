use std::sync::Arc;

use argon2::{
	password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::google::{self, GoogleProfile};
use crate::{
	model::{AuthProvider, NewUser, RegisterInput, User, UserChanges},
	repository::{self, UserStore},
};

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid email or password")]
	InvalidCredentials,
	#[error("no access token provided")]
	MissingToken,
	#[error("invalid or expired access token")]
	InvalidToken,
	#[error("user not found")]
	UserNotFound,
	#[error("invalid oauth state")]
	InvalidOAuthState,
	#[error("google sign-in is not configured")]
	GoogleDisabled,
	#[error("google sign-in failed")]
	Google(#[from] google::Error),
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("password hashing failed: {0}")]
	Hash(argon2::password_hash::Error),
	#[error("token signing failed: {0}")]
	Signing(jsonwebtoken::errors::Error),
	#[error("token lifetime is out of range")]
	Expiry,
	#[error(transparent)]
	Repository(#[from] repository::Error),
}

/// The claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
	sub: Uuid,
	iat: i64,
	exp: i64,
}

/// A freshly issued access token and the user it belongs to.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Authenticated {
	/// The signed access token, also set as the `access_token` cookie.
	pub token: String,
	pub user: User,
}

struct Keys {
	encoding: EncodingKey,
	decoding: DecodingKey,
	validation: Validation,
}

/// Verifies credentials and issues or parses signed access tokens.
#[derive(Clone)]
pub struct AuthService {
	users: UserStore,
	hasher: Argon2<'static>,
	keys: Arc<Keys>,
	ttl: Duration,
}

impl AuthService {
	pub fn new(users: UserStore, hasher: Argon2<'static>, secret: &[u8], ttl: Duration) -> Self {
		Self {
			users,
			hasher,
			keys: Arc::new(Keys {
				encoding: EncodingKey::from_secret(secret),
				decoding: DecodingKey::from_secret(secret),
				validation: Validation::default(),
			}),
			ttl,
		}
	}

	/// How long issued tokens stay valid.
	pub fn token_ttl(&self) -> Duration {
		self.ttl
	}

	/// Hashes a password into a PHC string with a random salt.
	pub fn hash_password(&self, password: &str) -> Result<String, Error> {
		let salt = SaltString::generate(&mut OsRng);

		self.hasher
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(Error::Hash)
	}

	fn verify_password(&self, password: &str, hash: &str) -> bool {
		PasswordHash::new(hash).is_ok_and(|parsed| {
			self.hasher
				.verify_password(password.as_bytes(), &parsed)
				.is_ok()
		})
	}

	pub fn issue_token(&self, user: &User) -> Result<String, Error> {
		let now = Utc::now();
		let expires_at = now.checked_add_signed(self.ttl).ok_or(Error::Expiry)?;
		let claims = Claims {
			sub: user.id,
			iat: now.timestamp(),
			exp: expires_at.timestamp(),
		};

		jsonwebtoken::encode(&Header::default(), &claims, &self.keys.encoding).map_err(Error::Signing)
	}

	/// Verifies the signature and expiry of a token and resolves its user.
	pub async fn parse_token(&self, token: &str) -> Result<User, Error> {
		let data = jsonwebtoken::decode::<Claims>(token, &self.keys.decoding, &self.keys.validation)
			.map_err(|_| Error::InvalidToken)?;

		match self.users.find_by_id(data.claims.sub).await {
			Ok(user) => Ok(user),
			Err(repository::Error::NotFound { .. }) => Err(Error::UserNotFound),
			Err(error) => Err(error.into()),
		}
	}

	pub async fn login(&self, email: &str, password: &str) -> Result<Authenticated, Error> {
		let user = match self.users.find_by_email(email).await {
			Ok(user) => user,
			Err(repository::Error::NotFound { .. }) => return Err(Error::InvalidCredentials),
			Err(error) => return Err(error.into()),
		};

		// accounts created through google have no password to check against
		let Some(hash) = user.password.as_deref() else {
			return Err(Error::InvalidCredentials);
		};

		if !self.verify_password(password, hash) {
			return Err(Error::InvalidCredentials);
		}

		tracing::debug!(user_id = %user.id, "user logged in");

		let token = self.issue_token(&user)?;
		Ok(Authenticated { token, user })
	}

	/// Creates a local account. The password is hashed before it is stored.
	pub async fn create_user(&self, input: RegisterInput) -> Result<User, Error> {
		input.validate()?;

		let password = self.hash_password(&input.password)?;
		let user = self
			.users
			.create(NewUser {
				name: input.name,
				lastname: input.lastname,
				email: input.email,
				password: Some(password),
				auth_provider: AuthProvider::Local,
				..NewUser::default()
			})
			.await?;

		Ok(user)
	}

	pub async fn register(&self, input: RegisterInput) -> Result<Authenticated, Error> {
		let user = self.create_user(input).await?;

		tracing::info!(user_id = %user.id, "user registered");

		let token = self.issue_token(&user)?;
		Ok(Authenticated { token, user })
	}

	/// Logs in the user with the profile's email, creating a Google account if none exists.
	///
	/// An existing local account is switched over to Google, which drops its password.
	pub async fn login_or_register_with_google(
		&self,
		profile: GoogleProfile,
	) -> Result<Authenticated, Error> {
		let user = match self.users.find_by_email(&profile.email).await {
			Ok(user) => {
				self.users
					.update(
						user.id,
						UserChanges {
							google_id: Some(profile.id),
							profile_picture: profile.picture,
							auth_provider: Some(AuthProvider::Google),
							..UserChanges::default()
						},
					)
					.await?
			}
			Err(repository::Error::NotFound { .. }) => {
				let user = self
					.users
					.create(NewUser {
						name: profile.name,
						email: profile.email,
						google_id: Some(profile.id),
						profile_picture: profile.picture,
						auth_provider: AuthProvider::Google,
						..NewUser::default()
					})
					.await?;

				tracing::info!(user_id = %user.id, "user registered through google");
				user
			}
			Err(error) => return Err(error.into()),
		};

		let token = self.issue_token(&user)?;
		Ok(Authenticated { token, user })
	}
}

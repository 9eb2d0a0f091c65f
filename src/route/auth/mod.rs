use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{
	error::{self, ErrorShape, Message},
	service::{auth::Error, google},
	AppState,
};

pub mod model;
pub mod route;

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/login", post_with(login, login_docs))
		.api_route("/register", post_with(register, register_docs))
		.api_route("/logout", get_with(logout, logout_docs))
		.api_route("/me", get_with(get_me, get_me_docs))
		.api_route("/google/login", get_with(google_login, google_login_docs))
		.api_route(
			"/google/callback",
			post_with(google_callback, google_callback_docs),
		)
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidCredentials
			| Self::MissingToken
			| Self::InvalidToken
			| Self::UserNotFound
			| Self::InvalidOAuthState
			| Self::Google(google::Error::UnverifiedEmail) => StatusCode::UNAUTHORIZED,
			Self::GoogleDisabled => StatusCode::NOT_FOUND,
			Self::Google(..) => StatusCode::BAD_GATEWAY,
			Self::Validation(..) => StatusCode::BAD_REQUEST,
			Self::Repository(error) => error.status(),
			Self::Hash(..) | Self::Signing(..) | Self::Expiry => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<Message> {
		match self {
			Self::Validation(errors) => error::validation_messages(&errors),
			Self::Repository(error) => error.into_message().into_vec(),
			Self::Hash(..) | Self::Signing(..) | Self::Expiry => {
				Message::new("internal server error").into_vec()
			}
			error => Message::new(error.to_string()).into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_signup_flow(pool: Database) {
		let app = app(pool);

		let response = app
			.post("/api/auth/register")
			.json(&json!({
				"name": "John",
				"lastname": "Smith",
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CREATED);
		assert!(response
			.header(header::SET_COOKIE)
			.to_str()
			.unwrap()
			.contains("access_token="));

		let body = response.json::<Value>();
		assert_eq!(body["user"]["email"], "john@smith.com");
		assert!(body["user"].get("password").is_none());

		let response = app
			.post("/api/auth/login")
			.json(&json!({
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let token = response.json::<Value>()["token"]
			.as_str()
			.unwrap()
			.to_owned();

		let response = app
			.get("/api/auth/me")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(response.json::<Value>()["name"], "John");
	}

	#[sqlx::test]
	async fn test_login_wrong_password(pool: Database) {
		let app = app(pool);
		register(&app, "john@smith.com").await;

		let response = app
			.post("/api/auth/login")
			.json(&json!({
				"email": "john@smith.com",
				"password": "not-the-password",
			}))
			.expect_failure()
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

		let body = response.json::<Value>();
		assert_eq!(body["success"], false);
		assert_eq!(body["errors"][0]["content"], "invalid email or password");
	}

	#[sqlx::test]
	async fn test_register_validation(pool: Database) {
		let app = app(pool);

		let response = app
			.post("/api/auth/register")
			.json(&json!({
				"name": "John",
				"email": "not-an-email",
				"password": "short",
			}))
			.expect_failure()
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

		let fields = response.json::<Value>()["errors"]
			.as_array()
			.unwrap()
			.iter()
			.map(|error| error["field"].as_str().unwrap().to_owned())
			.collect::<Vec<_>>();

		assert!(fields.contains(&"email".to_owned()));
		assert!(fields.contains(&"password".to_owned()));
	}

	#[sqlx::test]
	async fn test_register_duplicate_email(pool: Database) {
		let app = app(pool);
		register(&app, "john@smith.com").await;

		let response = app
			.post("/api/auth/register")
			.json(&json!({
				"name": "Johnny",
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.expect_failure()
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"email already taken"
		);
	}

	#[sqlx::test]
	async fn test_me_requires_token(pool: Database) {
		let app = app(pool);

		let response = app.get("/api/auth/me").expect_failure().await;
		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

		let response = app
			.get("/api/auth/me")
			.add_header(header::AUTHORIZATION, bearer("garbage"))
			.expect_failure()
			.await;
		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
	}

	#[sqlx::test]
	async fn test_cookie_session(pool: Database) {
		let mut app = app(pool);
		app.do_save_cookies();

		register(&app, "john@smith.com").await;

		let response = app.get("/api/auth/me").await;
		assert_eq!(response.json::<Value>()["email"], "john@smith.com");

		app.get("/api/auth/logout").await;

		let response = app.get("/api/auth/me").expect_failure().await;
		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
	}

	#[sqlx::test]
	async fn test_google_disabled(pool: Database) {
		let app = app(pool);

		let response = app.get("/api/auth/google/login").expect_failure().await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[sqlx::test]
	async fn test_google_callback_checks_state(pool: Database) {
		let app = app_with_google(pool);

		let response = app.get("/api/auth/google/login").await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert!(response
			.header(header::LOCATION)
			.to_str()
			.unwrap()
			.starts_with("https://accounts.google.com/"));

		let response = app
			.post("/api/auth/google/callback")
			.add_query_param("code", "some-code")
			.add_query_param("state", "forged")
			.expect_failure()
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"invalid oauth state"
		);
	}
}

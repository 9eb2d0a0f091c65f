use aide::axum::IntoApiResponse;
use axum::{
	extract::State,
	http::{header, StatusCode},
	response::{AppendHeaders, IntoResponse, Redirect},
};
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, OAuthState, Query, Session},
	openapi::tag,
	service::{auth::Error, AuthService, GoogleOAuth},
	session,
};

use super::{model, RouteError};

/// Log in
/// Logs in with an email and password, returning an access token that is also set as a cookie.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<model::Authenticated>"))]
pub async fn login(
	State(auth): State<AuthService>,
	Json(input): Json<model::LoginInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let authenticated = auth.login(&input.email, &input.password).await?;
	let cookie = session::create_cookie(authenticated.token.clone(), auth.token_ttl());

	Ok(([(header::SET_COOKIE, cookie.to_string())], Json(authenticated)))
}

/// Register account
/// Registers a new local account, returning an access token that is also set as a cookie.
#[route(tag = tag::AUTH, response(status = 201, description = "Registered successfully.", shape = "Json<model::Authenticated>"))]
pub async fn register(
	State(auth): State<AuthService>,
	Json(input): Json<model::RegisterInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let authenticated = auth.register(input).await?;
	let cookie = session::create_cookie(authenticated.token.clone(), auth.token_ttl());

	Ok((
		StatusCode::CREATED,
		[(header::SET_COOKIE, cookie.to_string())],
		Json(authenticated),
	)
		.into_response())
}

/// Log out
/// Clears the access token cookie. Tokens sent in the `Authorization` header stay valid until they expire.
#[route(tag = tag::AUTH, response(status = 204, description = "Logged out successfully."))]
pub async fn logout() -> impl IntoApiResponse {
	(
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		StatusCode::NO_CONTENT,
	)
}

/// Get session user
/// Returns the user the access token belongs to.
#[route(tag = tag::AUTH)]
pub async fn get_me(session: Session) -> Json<model::User> {
	Json(session.user)
}

/// Log in with Google
/// Redirects to the Google consent page. The `state` parameter is remembered in a short-lived cookie.
#[route(tag = tag::AUTH, response(status = 303, description = "Redirect to Google."))]
pub async fn google_login(
	State(google): State<Option<GoogleOAuth>>,
) -> Result<impl IntoApiResponse, RouteError> {
	let google = google.ok_or(Error::GoogleDisabled)?;
	let state = Uuid::new_v4().simple().to_string();
	let url = google.authorize_url(&state).map_err(Error::Google)?;

	Ok((
		[(
			header::SET_COOKIE,
			session::create_state_cookie(state).to_string(),
		)],
		Redirect::to(url.as_str()),
	)
		.into_response())
}

/// Complete Google login
/// Exchanges the authorization code from Google, then logs in the matching user or registers a new one.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<model::Authenticated>"))]
pub async fn google_callback(
	State(auth): State<AuthService>,
	State(google): State<Option<GoogleOAuth>>,
	OAuthState(expected): OAuthState,
	Query(input): Query<model::GoogleCallbackInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let google = google.ok_or(Error::GoogleDisabled)?;

	if expected.as_deref() != Some(input.state.as_str()) {
		return Err(Error::InvalidOAuthState.into());
	}

	let profile = google.exchange(&input.code).await.map_err(Error::Google)?;
	let authenticated = auth.login_or_register_with_google(profile).await?;
	let cookie = session::create_cookie(authenticated.token.clone(), auth.token_ttl());

	Ok((
		AppendHeaders([
			(header::SET_COOKIE, cookie.to_string()),
			(header::SET_COOKIE, session::clear_state_cookie().to_string()),
		]),
		Json(authenticated),
	)
		.into_response())
}

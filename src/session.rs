use axum::http::{header, HeaderMap};
use chrono::Duration;

pub const COOKIE_NAME: &str = "access_token";
pub const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

/// Creates the access token cookie, expiring together with the token.
pub fn create_cookie(token: String, ttl: Duration) -> cookie::Cookie<'static> {
	cookie::Cookie::build((COOKIE_NAME, token))
		.secure(!cfg!(debug_assertions))
		.http_only(true)
		.same_site(cookie::SameSite::Lax)
		.path("/")
		.max_age(cookie::time::Duration::seconds(ttl.num_seconds()))
		.into()
}

/// Creates an empty access token cookie used to invalidate a previous one
pub fn clear_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}

/// Creates the short-lived cookie holding the OAuth `state` parameter.
pub fn create_state_cookie(state: String) -> cookie::Cookie<'static> {
	cookie::Cookie::build((OAUTH_STATE_COOKIE_NAME, state))
		.secure(!cfg!(debug_assertions))
		.http_only(true)
		.same_site(cookie::SameSite::Lax)
		.path("/api/auth/google")
		.max_age(cookie::time::Duration::minutes(10))
		.into()
}

pub fn clear_state_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(OAUTH_STATE_COOKIE_NAME)
		.http_only(true)
		.path("/api/auth/google")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}

/// Finds the value of the cookie called `name` in the request headers.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
	headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == name)
		.map(|cookie| cookie.value().to_owned())
}

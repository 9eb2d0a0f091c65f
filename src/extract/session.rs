use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};

use crate::{
	error::RouteError,
	model::User,
	openapi::{SECURITY_SCHEME_BEARER, SECURITY_SCHEME_COOKIE},
	service::{auth, AuthService},
	session,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// Resolves the signed-in user from the access token sent with the request.
///
/// The token is read from the `Authorization` header first, then from the access token cookie.
/// If neither is present, a [`auth::Error::MissingToken`] is returned.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub user: User,
}

fn bearer_token(parts: &request::Parts) -> Result<Option<String>, auth::Error> {
	let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
		return Ok(None);
	};

	let value = value.to_str().map_err(|_| auth::Error::InvalidToken)?;
	let token = value
		.strip_prefix(AUTHORIZATION_PREFIX)
		.ok_or(auth::Error::InvalidToken)?;

	Ok(Some(token.trim().to_owned()))
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	AuthService: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let token = match bearer_token(parts)? {
			Some(token) => token,
			None => session::find_cookie(&parts.headers, session::COOKIE_NAME)
				.ok_or(auth::Error::MissingToken)?,
		};

		let user = AuthService::from_ref(state).parse_token(&token).await?;

		Ok(Self { user })
	}
}

impl OperationInput for Session {
	/// Adds the bearer token and cookie requirements to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.extend([
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
			[(SECURITY_SCHEME_COOKIE.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		]);
	}
}

/// The OAuth `state` value remembered in a cookie when the Google flow started.
#[derive(Debug)]
pub struct OAuthState(pub Option<String>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OAuthState
where
	S: Sync + Send,
{
	type Rejection = std::convert::Infallible;

	async fn from_request_parts(
		parts: &mut request::Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		Ok(Self(session::find_cookie(
			&parts.headers,
			session::OAUTH_STATE_COOKIE_NAME,
		)))
	}
}

impl OperationInput for OAuthState {}

use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{
	error::{self, ErrorShape, Message},
	service::auth,
	AppState,
};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("you can only change your own account")]
	NotSelf(Uuid),
	#[error(transparent)]
	Auth(#[from] auth::Error),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_users, get_users_docs).post_with(create_user, create_user_docs),
		)
		.api_route(
			"/:id",
			get_with(get_user, get_user_docs)
				.put_with(update_user, update_user_docs)
				.delete_with(delete_user, delete_user_docs),
		)
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::NotSelf(..) => StatusCode::FORBIDDEN,
			Self::Auth(error) => error.status(),
		}
	}

	fn into_errors(self) -> Vec<Message> {
		match self {
			Self::NotSelf(user) => Message::new("you can only change your own account")
				.detail("user", user.to_string())
				.into_vec(),
			Self::Auth(error) => error.into_errors(),
		}
	}
}

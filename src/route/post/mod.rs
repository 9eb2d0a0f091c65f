use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{
	error::{self, ErrorShape, Message},
	AppState,
};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("only the author can change this post")]
	NotAuthor(Uuid),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_posts, get_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/:id",
			get_with(get_post, get_post_docs)
				.put_with(update_post, update_post_docs)
				.delete_with(delete_post, delete_post_docs),
		)
		.api_route(
			"/:id/categories",
			get_with(get_post_categories, get_post_categories_docs)
				.put_with(replace_post_categories, replace_post_categories_docs),
		)
		.api_route(
			"/:id/categories/:category_id",
			post_with(assign_category, assign_category_docs)
				.delete_with(unassign_category, unassign_category_docs),
		)
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::NotAuthor(..) => StatusCode::FORBIDDEN,
		}
	}

	fn into_errors(self) -> Vec<Message> {
		let content = self.to_string();

		match self {
			Self::NotAuthor(post) => Message::new(content)
				.detail("post", post.to_string())
				.into_vec(),
		}
	}
}

use std::convert::Infallible;

use aide::axum::{routing::get_with, ApiRouter};

use crate::{error, AppState};

pub mod model;
pub mod route;

pub type RouteError = error::RouteError<Infallible>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_categories, get_categories_docs)
				.post_with(create_category, create_category_docs),
		)
		.api_route(
			"/:id",
			get_with(get_category, get_category_docs)
				.put_with(update_category, update_category_docs)
				.delete_with(delete_category, delete_category_docs),
		)
}

use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use macros::route;

use crate::{
	extract::{Json, Path, Session},
	openapi::tag,
	repository::CategoryStore,
};

use super::{model, RouteError};

/// Get all categories
/// Returns every category, ordered by title.
#[route(tag = tag::CATEGORY)]
pub async fn get_categories(
	State(categories): State<CategoryStore>,
) -> Result<Json<Vec<model::Category>>, RouteError> {
	Ok(Json(categories.find_all().await?))
}

/// Get single category
/// Returns a single category by its unique id or slug.
#[route(tag = tag::CATEGORY)]
pub async fn get_category(
	State(categories): State<CategoryStore>,
	Path(path): Path<model::SlugOrIdPath>,
) -> Result<Json<model::Category>, RouteError> {
	let category = match path.as_id() {
		Some(id) => categories.find_by_id(id).await?,
		None => categories.find_by_slug(&path.id).await?,
	};

	Ok(Json(category))
}

/// Create category
#[route(tag = tag::CATEGORY, response(status = 201, description = "Created successfully.", shape = "Json<model::Category>"))]
pub async fn create_category(
	State(categories): State<CategoryStore>,
	_session: Session,
	Json(input): Json<model::CreateCategoryInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let category = categories.create(input).await?;

	Ok((StatusCode::CREATED, Json(category)).into_response())
}

/// Update category
/// Renames a category, deriving a new slug when the title changes.
#[route(tag = tag::CATEGORY)]
pub async fn update_category(
	State(categories): State<CategoryStore>,
	_session: Session,
	Path(path): Path<model::IdPath>,
	Json(input): Json<model::UpdateCategoryInput>,
) -> Result<Json<model::Category>, RouteError> {
	Ok(Json(categories.update(path.id, input).await?))
}

/// Delete category
/// Deletes a category and removes it from every post.
#[route(tag = tag::CATEGORY, response(status = 204, description = "Deleted successfully."))]
pub async fn delete_category(
	State(categories): State<CategoryStore>,
	_session: Session,
	Path(path): Path<model::IdPath>,
) -> Result<impl IntoApiResponse, RouteError> {
	categories.delete(path.id).await?;

	Ok(StatusCode::NO_CONTENT)
}

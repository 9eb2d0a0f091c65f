use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use macros::route;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	repository::{CategoryStore, PostStore},
};

use super::{model, Error, RouteError};

fn ensure_author(post: &model::Post, session: &Session) -> Result<(), Error> {
	if post.author.id == session.user.id {
		Ok(())
	} else {
		Err(Error::NotAuthor(post.id))
	}
}

/// Get all posts
/// Returns every post, newest first. When `page` or `size` is given, returns a single page instead.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(posts): State<PostStore>,
	Query(input): Query<model::PaginateInput>,
) -> Result<Json<model::PostListing>, RouteError> {
	let Some(paginate) = input.paginate() else {
		return Ok(Json(model::PostListing::All(posts.find_all().await?)));
	};

	let (items, total) = posts
		.find_page(paginate.limit(), paginate.offset())
		.await?;

	Ok(Json(model::PostListing::Page(model::Page {
		items,
		total,
		page: paginate.page,
		size: paginate.size,
	})))
}

/// Get single post
/// Returns a single post by its unique id or slug.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(posts): State<PostStore>,
	Path(path): Path<model::SlugOrIdPath>,
) -> Result<Json<model::Post>, RouteError> {
	let post = match path.as_id() {
		Some(id) => posts.find_by_id(id).await?,
		None => posts.find_by_slug(&path.id).await?,
	};

	Ok(Json(post))
}

/// Create post
/// Creates a new post written by the authenticated user. The slug is derived from the title.
#[route(tag = tag::POST, response(status = 201, description = "Created successfully.", shape = "Json<model::Post>"))]
pub async fn create_post(
	State(posts): State<PostStore>,
	session: Session,
	Json(input): Json<model::CreatePostInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let post = posts.create(session.user.id, input).await?;

	tracing::info!(post_id = %post.id, slug = %post.slug, "post created");

	Ok((StatusCode::CREATED, Json(post)).into_response())
}

/// Update post
/// Updates your own post. Changing the title derives a new slug.
#[route(tag = tag::POST)]
pub async fn update_post(
	State(posts): State<PostStore>,
	session: Session,
	Path(path): Path<model::IdPath>,
	Json(input): Json<model::UpdatePostInput>,
) -> Result<Json<model::Post>, RouteError> {
	ensure_author(&posts.find_by_id(path.id).await?, &session)?;

	Ok(Json(posts.update(path.id, input).await?))
}

/// Delete post
/// Deletes your own post. This action is irreversible.
#[route(tag = tag::POST, response(status = 204, description = "Deleted successfully."))]
pub async fn delete_post(
	State(posts): State<PostStore>,
	session: Session,
	Path(path): Path<model::IdPath>,
) -> Result<impl IntoApiResponse, RouteError> {
	ensure_author(&posts.find_by_id(path.id).await?, &session)?;

	posts.delete(path.id).await?;

	Ok(StatusCode::NO_CONTENT)
}

/// Get post categories
/// Returns the categories a post is filed under.
#[route(tag = tag::POST)]
pub async fn get_post_categories(
	State(posts): State<PostStore>,
	Path(path): Path<model::IdPath>,
) -> Result<Json<Vec<model::Category>>, RouteError> {
	let post = posts.find_by_id(path.id).await?;

	Ok(Json(posts.categories_for_post(post.id).await?))
}

/// Replace post categories
/// Files your own post under exactly the given categories. On failure, the previous categories are kept.
#[route(tag = tag::POST)]
pub async fn replace_post_categories(
	State(posts): State<PostStore>,
	State(categories): State<CategoryStore>,
	session: Session,
	Path(path): Path<model::IdPath>,
	Json(input): Json<model::ReplaceCategoriesInput>,
) -> Result<Json<Vec<model::Category>>, RouteError> {
	ensure_author(&posts.find_by_id(path.id).await?, &session)?;

	for category_id in &input.category_ids {
		categories.find_by_id(*category_id).await?;
	}

	posts
		.replace_categories(path.id, &input.category_ids)
		.await?;

	tracing::debug!(post_id = %path.id, count = input.category_ids.len(), "replaced post categories");

	Ok(Json(posts.categories_for_post(path.id).await?))
}

/// Assign category
/// Files your own post under a category.
#[route(tag = tag::POST, response(status = 204, description = "Assigned successfully."))]
pub async fn assign_category(
	State(posts): State<PostStore>,
	State(categories): State<CategoryStore>,
	session: Session,
	Path(path): Path<model::PostCategoryPath>,
) -> Result<impl IntoApiResponse, RouteError> {
	ensure_author(&posts.find_by_id(path.id).await?, &session)?;
	categories.find_by_id(path.category_id).await?;

	posts.assign_category(path.id, path.category_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

/// Unassign category
/// Removes a category from your own post. Removing a category the post is not filed under succeeds.
#[route(tag = tag::POST, response(status = 204, description = "Unassigned successfully."))]
pub async fn unassign_category(
	State(posts): State<PostStore>,
	session: Session,
	Path(path): Path<model::PostCategoryPath>,
) -> Result<impl IntoApiResponse, RouteError> {
	ensure_author(&posts.find_by_id(path.id).await?, &session)?;

	posts.unassign_category(path.id, path.category_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

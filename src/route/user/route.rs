use aide::axum::IntoApiResponse;
use axum::{
	extract::State,
	http::{header, StatusCode},
	response::IntoResponse,
};
use macros::route;

use crate::{
	extract::{Json, Path, Session},
	openapi::tag,
	repository::UserStore,
	service::AuthService,
	session,
};

use super::{model, Error, RouteError};

fn ensure_self(session: &Session, id: uuid::Uuid) -> Result<(), Error> {
	if session.user.id == id {
		Ok(())
	} else {
		Err(Error::NotSelf(id))
	}
}

/// Get all users
#[route(tag = tag::USER)]
pub async fn get_users(
	State(users): State<UserStore>,
	_session: Session,
) -> Result<Json<Vec<model::User>>, RouteError> {
	Ok(Json(users.find_all().await?))
}

/// Get single user
/// Returns a single user by their unique id.
#[route(tag = tag::USER)]
pub async fn get_user(
	State(users): State<UserStore>,
	_session: Session,
	Path(path): Path<model::IdPath>,
) -> Result<Json<model::User>, RouteError> {
	Ok(Json(users.find_by_id(path.id).await?))
}

/// Create user
/// Creates a new local account. Unlike registering, no access token is issued.
#[route(tag = tag::USER, response(status = 201, description = "Created successfully.", shape = "Json<model::User>"))]
pub async fn create_user(
	State(auth): State<AuthService>,
	_session: Session,
	Json(input): Json<model::RegisterInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = auth.create_user(input).await.map_err(Error::Auth)?;

	Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// Update user
/// Updates your own account. Omitted fields are left untouched.
#[route(tag = tag::USER)]
pub async fn update_user(
	State(users): State<UserStore>,
	session: Session,
	Path(path): Path<model::IdPath>,
	Json(input): Json<model::UpdateUserInput>,
) -> Result<Json<model::User>, RouteError> {
	ensure_self(&session, path.id)?;

	Ok(Json(users.update(path.id, input.into()).await?))
}

/// Delete user
/// Deletes your own account along with your posts. This action is irreversible.
#[route(tag = tag::USER, response(status = 204, description = "Deleted successfully."))]
pub async fn delete_user(
	State(users): State<UserStore>,
	session: Session,
	Path(path): Path<model::IdPath>,
) -> Result<impl IntoApiResponse, RouteError> {
	ensure_self(&session, path.id)?;

	users.delete(path.id).await?;

	Ok((
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		StatusCode::NO_CONTENT,
	))
}

use axum::{
	extract::{Multipart, State},
	http::StatusCode,
	response::IntoResponse,
};

use crate::{
	error::AppError,
	extract::{Json, Path, Session},
	service::{file::Error, FileService},
};

use super::{model, RouteError};

/// Stores the `file` field of a multipart body for the authenticated user.
pub async fn upload_file(
	State(files): State<FileService>,
	session: Session,
	mut multipart: Multipart,
) -> Result<impl IntoResponse, RouteError> {
	while let Some(field) = multipart.next_field().await.map_err(AppError::from)? {
		if field.name() != Some(model::FILE_FIELD) {
			continue;
		}

		let original = field.file_name().unwrap_or_default().to_owned();
		let data = field.bytes().await.map_err(AppError::from)?;

		let stored = files.save(session.user.id, &original, &data).await?;

		return Ok((StatusCode::CREATED, Json(stored)));
	}

	Err(Error::MissingFile.into())
}

/// Deletes one of the authenticated user's files.
pub async fn delete_file(
	State(files): State<FileService>,
	session: Session,
	Path(path): Path<model::FilenamePath>,
) -> Result<impl IntoResponse, RouteError> {
	files.delete(session.user.id, &path.filename).await?;

	Ok(StatusCode::NO_CONTENT)
}

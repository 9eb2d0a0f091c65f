use axum::{
	extract::DefaultBodyLimit,
	http::StatusCode,
	routing::{delete, post},
	Router,
};

use crate::{
	error::{self, ErrorShape, Message},
	service::file::Error,
	AppState,
};

pub mod model;
pub mod route;

pub type RouteError = error::RouteError<Error>;

/// Room left for the multipart boundaries and headers around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Multipart bodies are not described by the generated documentation, so these are plain routes.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
	use route::*;

	Router::new()
		.route("/", post(upload_file))
		.route("/:filename", delete(delete_file))
		.layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD))
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::NotFound(..) => StatusCode::NOT_FOUND,
			Self::InvalidFilename(..) | Self::MissingFile => StatusCode::BAD_REQUEST,
			Self::TooLarge(..) => StatusCode::PAYLOAD_TOO_LARGE,
			Self::Io(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<Message> {
		match self {
			Self::NotFound(ref filename) | Self::InvalidFilename(ref filename) => {
				let filename = filename.clone();

				Message::new(self.to_string())
					.field("filename")
					.detail("filename", filename)
					.into_vec()
			}
			Self::MissingFile => Message::new(self.to_string()).field("file").into_vec(),
			Self::TooLarge(..) => Message::new(self.to_string()).into_vec(),
			Self::Io(..) => Message::new("internal server error").into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use axum_test::multipart::{MultipartForm, Part};

	use crate::test::*;

	fn form(name: &str, contents: &'static [u8]) -> MultipartForm {
		MultipartForm::new().add_part("file", Part::bytes(contents).file_name(name))
	}

	#[sqlx::test]
	async fn test_upload_and_delete(pool: Database) {
		let uploads = tempfile::tempdir().unwrap();
		let app = app_with_config(
			pool,
			Config {
				upload_dir: uploads.path().to_path_buf(),
				..config()
			},
		);
		let (token, user_id) = register(&app, "john@smith.com").await;

		let response = app
			.post("/api/files")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.multipart(form("notes.txt", b"hello world"))
			.await;

		assert_eq!(response.status_code(), StatusCode::CREATED);

		let stored = response.json::<Value>();
		let filename = stored["filename"].as_str().unwrap().to_owned();
		assert!(filename.starts_with("notes_"));
		assert_eq!(stored["size"], 11);
		assert_eq!(stored["url"], format!("/uploads/{user_id}/{filename}"));

		let response = app.get(&format!("/uploads/{user_id}/{filename}")).await;
		assert_eq!(response.text(), "hello world");

		let response = app
			.delete(&format!("/api/files/{filename}"))
			.add_header(header::AUTHORIZATION, bearer(&token))
			.await;
		assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

		let response = app
			.delete(&format!("/api/files/{filename}"))
			.add_header(header::AUTHORIZATION, bearer(&token))
			.expect_failure()
			.await;
		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[sqlx::test]
	async fn test_upload_requires_file_field(pool: Database) {
		let uploads = tempfile::tempdir().unwrap();
		let app = app_with_config(
			pool,
			Config {
				upload_dir: uploads.path().to_path_buf(),
				..config()
			},
		);
		let (token, _) = register(&app, "john@smith.com").await;

		let response = app
			.post("/api/files")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.multipart(MultipartForm::new().add_text("title", "no file here"))
			.expect_failure()
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "file");
	}

	#[sqlx::test]
	async fn test_upload_too_large(pool: Database) {
		let uploads = tempfile::tempdir().unwrap();
		let app = app_with_config(
			pool,
			Config {
				upload_dir: uploads.path().to_path_buf(),
				max_upload_bytes: 4,
				..config()
			},
		);
		let (token, _) = register(&app, "john@smith.com").await;

		let response = app
			.post("/api/files")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.multipart(form("big.txt", b"more than four bytes"))
			.expect_failure()
			.await;

		assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
	}

	#[sqlx::test]
	async fn test_upload_requires_auth(pool: Database) {
		let app = app(pool);

		let response = app
			.post("/api/files")
			.multipart(form("notes.txt", b"hello"))
			.expect_failure()
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
	}
}

use std::{borrow::Cow, convert::Infallible};

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::{multipart::MultipartError, rejection},
	http::{Response, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::repository;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message presented to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message {
	/// A human-readable description of the error.
	pub content: Cow<'static, str>,
	/// The request field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'static, str>>,
	/// Additional structured information about the error.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Map>,
}

impl Message {
	pub fn new(content: impl Into<Cow<'static, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(Map::new)
			.insert(key.to_owned(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
	/// Always `false`.
	pub success: bool,
	pub errors: Vec<Message>,
}

fn respond(status: StatusCode, errors: Vec<Message>) -> Response<Body> {
	(
		status,
		axum::Json(ErrorResponse {
			success: false,
			errors,
		}),
	)
		.into_response()
}

/// Converts validation failures into one message per failed rule, tagged with the field.
///
/// The rejected value itself is left out of the details.
pub fn validation_messages(errors: &validator::ValidationErrors) -> Vec<Message> {
	errors
		.field_errors()
		.into_iter()
		.flat_map(|(field, errors)| {
			let field = field.to_string();

			errors.iter().map(move |error| {
				let content = error
					.message
					.clone()
					.unwrap_or_else(|| error.code.clone());
				let mut message = Message::new(content).field(field.clone());

				for (key, value) in &error.params {
					if key != "value" {
						message = message.detail(key, value.clone());
					}
				}

				message
			})
		})
		.collect()
}

/// Describes how a route-specific error is presented to the client.
///
/// Messages are shown to the client verbatim, so they should not contain sensitive information.
pub trait ErrorShape: std::fmt::Debug {
	fn status(&self) -> StatusCode;

	fn into_errors(self) -> Vec<Message>;
}

impl ErrorShape for Infallible {
	fn status(&self) -> StatusCode {
		match *self {}
	}

	fn into_errors(self) -> Vec<Message> {
		match self {}
	}
}

/// Errors shared by every route: extractor rejections, validation and storage.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("invalid json body: {0:?}")]
	Json(axum_jsonschema::JsonSchemaRejection),
	#[error("invalid query string: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("invalid path: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("invalid multipart body: {0}")]
	Multipart(#[from] MultipartError),
	#[error(transparent)]
	Repository(#[from] repository::Error),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

impl From<axum_jsonschema::JsonSchemaRejection> for AppError {
	fn from(rejection: axum_jsonschema::JsonSchemaRejection) -> Self {
		Self::Json(rejection)
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::Validation(errors) => respond(StatusCode::BAD_REQUEST, validation_messages(&errors)),
			Self::Json(rejection) => rejection.into_response(),
			Self::Query(rejection) => {
				respond(rejection.status(), Message::new(rejection.body_text()).into_vec())
			}
			Self::Path(rejection) => {
				respond(rejection.status(), Message::new(rejection.body_text()).into_vec())
			}
			Self::Multipart(error) => {
				respond(error.status(), Message::new(error.body_text()).into_vec())
			}
			Self::Repository(error) => {
				let status = error.status();

				if status.is_server_error() {
					tracing::error!(?error, "repository error");
				}

				respond(status, error.into_message().into_vec())
			}
			Self::Database(error) => {
				tracing::error!(?error, "database error");

				respond(
					StatusCode::INTERNAL_SERVER_ERROR,
					Message::new("internal server error").into_vec(),
				)
			}
		}
	}
}

/// The error type returned by route handlers, generic over the route-specific error.
#[derive(Debug)]
pub enum RouteError<T> {
	App(AppError),
	Route(T),
}

impl<T: ErrorShape> From<T> for RouteError<T> {
	fn from(error: T) -> Self {
		Self::Route(error)
	}
}

impl<T> From<AppError> for RouteError<T> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<T> From<repository::Error> for RouteError<T> {
	fn from(error: repository::Error) -> Self {
		Self::App(AppError::Repository(error))
	}
}

impl<T> From<sqlx::Error> for RouteError<T> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => {
				let status = error.status();

				if status.is_server_error() {
					tracing::error!(?error, "route error");
				}

				respond(status, error.into_errors())
			}
		}
	}
}

impl<T> OperationOutput for RouteError<T> {
	type Inner = Self;
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_message_builder() {
		let message = Message::new("slug taken")
			.field("title")
			.detail("slug", "hello-world");

		assert_eq!(message.content, "slug taken");
		assert_eq!(message.field.as_deref(), Some("title"));
		assert_eq!(
			message.details.unwrap()["slug"],
			serde_json::json!("hello-world")
		);
	}

	#[test]
	fn test_repository_status() {
		let not_found = RouteError::<Infallible>::from(repository::Error::NotFound {
			entity: "post",
			key: "missing".into(),
		});
		assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

		let conflict = RouteError::<Infallible>::from(repository::Error::Conflict(
			"UNIQUE constraint failed: users.email".into(),
		));
		assert_eq!(conflict.into_response().status(), StatusCode::BAD_REQUEST);

		let invalid = RouteError::<Infallible>::from(repository::Error::Validation(
			"empty slug".into(),
		));
		assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

		let storage =
			RouteError::<Infallible>::from(repository::Error::Storage(sqlx::Error::PoolClosed));
		assert_eq!(
			storage.into_response().status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}
}

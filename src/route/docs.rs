use std::sync::Arc;

use aide::{
	axum::{
		routing::{get, get_with},
		ApiRouter, IntoApiResponse,
	},
	openapi::OpenApi,
	scalar::Scalar,
};
use axum::{response::IntoResponse, Extension};

use crate::extract::Json;

pub const OPENAPI_PATH: &str = "/docs/private/api.json";

pub fn routes() -> ApiRouter {
	ApiRouter::new()
		.api_route(
			"/",
			get_with(
				Scalar::new(OPENAPI_PATH)
					.with_title("Blog API")
					.axum_handler(),
				|op| op.description("This documentation page."),
			),
		)
		.route("/private/api.json", get(serve_docs))
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
	Json(api.as_ref()).into_response()
}

#[cfg(test)]
mod test {
	use super::OPENAPI_PATH;
	use crate::test::*;

	#[sqlx::test]
	async fn test_openapi_document(pool: Database) {
		let app = app(pool);

		let response = app.get(OPENAPI_PATH).await;
		let document = response.json::<Value>();

		assert_eq!(document["info"]["title"], "Blog API");
		assert!(document["paths"]["/api/posts/{id}/categories"]["put"].is_object());
		assert!(document["components"]["securitySchemes"]["Bearer"].is_object());

		let response = app.get("/docs").await;
		assert_eq!(response.status_code(), StatusCode::OK);
	}
}

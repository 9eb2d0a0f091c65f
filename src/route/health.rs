use std::convert::Infallible;

use aide::axum::{routing::get_with, ApiRouter};
use axum::extract::State;
use macros::route;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{error, extract::Json, openapi::tag, AppState, Database};

pub type RouteError = error::RouteError<Infallible>;

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new().api_route("/", get_with(health, health_docs))
}

#[derive(Serialize, JsonSchema)]
pub struct Health {
	/// Always `ok` when the service can reach its database.
	pub status: &'static str,
	pub version: &'static str,
}

/// Health check
/// Reports whether the service is up and its database reachable.
#[route(tag = tag::HEALTH)]
pub async fn health(State(database): State<Database>) -> Result<Json<Health>, RouteError> {
	sqlx::query("SELECT 1").execute(&database).await?;

	Ok(Json(Health {
		status: "ok",
		version: env!("CARGO_PKG_VERSION"),
	}))
}

#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod model;
mod openapi;
mod repository;
mod route;
mod service;
mod session;
mod slug;
mod trace;


use std::{sync::Arc, time::Duration};

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{
	http::{header, HeaderValue, Method, Response},
	Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::{Any, CorsLayer},
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	services::ServeDir,
	trace::TraceLayer,
};

use config::Config;
use repository::{
	CategoryStore, PostStore, SqliteCategoryRepository, SqlitePostRepository,
	SqliteUserRepository, UserStore,
};
use service::{AuthService, FileService, GoogleOAuth};

pub type Database = sqlx::Pool<sqlx::Sqlite>;
pub type AppState = State;

/// The shared application state.
///
/// Every field can be extracted on its own with [`axum::extract::State`].
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub users: UserStore,
	pub posts: PostStore,
	pub categories: CategoryStore,
	pub auth: AuthService,
	/// Present only when Google sign-in is configured.
	pub google: Option<GoogleOAuth>,
	pub files: FileService,
}

impl State {
	pub fn new(database: Database, config: &Config) -> Self {
		let users: UserStore = Arc::new(SqliteUserRepository::new(database.clone()));

		Self {
			posts: Arc::new(SqlitePostRepository::new(database.clone())),
			categories: Arc::new(SqliteCategoryRepository::new(database.clone())),
			auth: AuthService::new(
				users.clone(),
				Argon2::default(),
				config.jwt_secret.as_bytes(),
				config.token_ttl,
			),
			google: config.google.clone().map(GoogleOAuth::new),
			files: FileService::new(config.upload_dir.clone(), config.max_upload_bytes),
			users,
			database,
		}
	}
}

fn cors(config: &Config) -> CorsLayer {
	let layer = CorsLayer::new()
		.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
		.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

	match config
		.client_url
		.as_deref()
		.and_then(|url| url.parse::<HeaderValue>().ok())
	{
		Some(origin) => layer.allow_origin(origin).allow_credentials(true),
		None => layer.allow_origin(Any),
	}
}

/// Builds the full application router, including documentation and static uploads.
pub fn app(state: State, config: &Config) -> Router {
	let mut api = OpenApi::default();

	ApiRouter::new()
		.nest_api_service(
			"/api/health",
			route::health::routes().with_state(state.clone()),
		)
		.nest_api_service("/api/auth", route::auth::routes().with_state(state.clone()))
		.nest_api_service("/api/users", route::user::routes().with_state(state.clone()))
		.nest_api_service("/api/posts", route::post::routes().with_state(state.clone()))
		.nest_api_service(
			"/api/categories",
			route::category::routes().with_state(state.clone()),
		)
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.nest(
			"/api/files",
			route::file::routes(config.max_upload_bytes).with_state(state),
		)
		.nest_service("/uploads", ServeDir::new(&config.upload_dir))
		.layer(Extension(Arc::new(api)))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(TraceLayer::new_for_http().on_response(
					|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
						tracing::info!(
							status = response.status().as_u16(),
							histogram.http_request_duration_ms = latency.as_secs_f64() * 1000.0,
							"finished processing request"
						);
					},
				))
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new())
				.layer(cors(config)),
		)
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = Config::from_env().expect("invalid configuration");
	let _guard = trace::init_tracing_subscriber(&config);

	let database = repository::connect(&config.database_url)
		.await
		.expect("failed to connect to database");

	sqlx::migrate!()
		.run(&database)
		.await
		.expect("failed to run migrations");

	let app = app(State::new(database, &config), &config);

	let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!(host = %config.host, port = config.port, "listening");

	axum::serve(listener, app)
		.await
		.expect("failed to start server");
}

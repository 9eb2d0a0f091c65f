pub use crate::{
	model::{RegisterInput, User},
	service::Authenticated,
};

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
}

/// The parameters Google appends when redirecting back after consent.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct GoogleCallbackInput {
	/// The authorization code to exchange.
	#[validate(length(min = 1))]
	pub code: String,
	/// Must match the state issued when the flow started.
	#[validate(length(min = 1))]
	pub state: String,
}

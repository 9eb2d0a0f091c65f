pub use crate::service::StoredFile;

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

/// The field uploads are read from.
pub const FILE_FIELD: &str = "file";

#[derive(Deserialize, Validate, JsonSchema)]
pub struct FilenamePath {
	#[validate(length(min = 1, max = 255))]
	pub filename: String,
}

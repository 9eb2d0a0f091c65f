use std::{
	io,
	path::{Path, PathBuf},
};

use chrono::Utc;
use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("file {0} not found")]
	NotFound(String),
	#[error("invalid file name {0}")]
	InvalidFilename(String),
	#[error("file exceeds the maximum size of {0} bytes")]
	TooLarge(usize),
	#[error("no file was provided in the `file` field")]
	MissingFile,
	#[error("file storage error: {0}")]
	Io(#[from] io::Error),
}

/// A file stored for a user.
#[derive(Debug, Serialize, JsonSchema)]
pub struct StoredFile {
	/// The unique name the file was stored under.
	pub filename: String,
	/// The path the file is served from.
	pub url: String,
	/// The size of the file in bytes.
	pub size: usize,
}

/// Stores uploaded files on disk, in one directory per user.
#[derive(Clone)]
pub struct FileService {
	root: PathBuf,
	max_size: usize,
}

impl FileService {
	pub fn new(root: impl Into<PathBuf>, max_size: usize) -> Self {
		Self {
			root: root.into(),
			max_size,
		}
	}

	/// Builds a collision-free name of the form `<stem>_<timestamp>_<id><.ext>`.
	///
	/// Only the final component of `original` is kept, so client-supplied paths cannot escape the user directory.
	pub fn unique_filename(original: &str) -> String {
		let name = Path::new(original)
			.file_name()
			.and_then(|name| name.to_str())
			.unwrap_or_default();
		let name = Path::new(name);

		let stem = name
			.file_stem()
			.and_then(|stem| stem.to_str())
			.filter(|stem| !stem.is_empty())
			.unwrap_or("file");
		let extension = name
			.extension()
			.and_then(|extension| extension.to_str())
			.map(|extension| format!(".{extension}"))
			.unwrap_or_default();

		let timestamp = Utc::now().format("%Y%m%d%H%M%S");
		let id = Uuid::new_v4().simple().to_string();

		format!("{stem}_{timestamp}_{}{extension}", &id[..8])
	}

	fn user_dir(&self, owner: Uuid) -> PathBuf {
		self.root.join(owner.to_string())
	}

	pub async fn save(&self, owner: Uuid, original: &str, data: &[u8]) -> Result<StoredFile, Error> {
		if data.len() > self.max_size {
			return Err(Error::TooLarge(self.max_size));
		}

		let directory = self.user_dir(owner);
		tokio::fs::create_dir_all(&directory).await?;

		let filename = Self::unique_filename(original);
		tokio::fs::write(directory.join(&filename), data).await?;

		tracing::info!(%owner, %filename, size = data.len(), "stored file");

		Ok(StoredFile {
			url: format!("/uploads/{owner}/{filename}"),
			filename,
			size: data.len(),
		})
	}

	pub async fn delete(&self, owner: Uuid, filename: &str) -> Result<(), Error> {
		let is_plain_name = Path::new(filename)
			.file_name()
			.is_some_and(|name| name == filename);

		if !is_plain_name {
			return Err(Error::InvalidFilename(filename.to_owned()));
		}

		match tokio::fs::remove_file(self.user_dir(owner).join(filename)).await {
			Ok(()) => Ok(()),
			Err(error) if error.kind() == io::ErrorKind::NotFound => {
				Err(Error::NotFound(filename.to_owned()))
			}
			Err(error) => Err(error.into()),
		}
	}
}

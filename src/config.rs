use std::{path::PathBuf, str::FromStr};

use chrono::{Duration, Utc};
use tracing::Level;

use crate::service::GoogleConfig;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{key} has an invalid value: {value}")]
	Invalid { key: &'static str, value: String },
}

/// Runtime configuration, read once at startup.
#[derive(Clone)]
pub struct Config {
	pub database_url: String,
	pub host: String,
	pub port: u16,
	/// The secret used to sign access tokens.
	pub jwt_secret: String,
	pub token_ttl: Duration,
	/// The origin of the frontend, allowed by CORS and used as the OAuth redirect base.
	pub client_url: Option<String>,
	pub upload_dir: PathBuf,
	pub max_upload_bytes: usize,
	/// Present only when Google sign-in is configured.
	pub google: Option<GoogleConfig>,
	pub log_level: Level,
	/// Where traces and metrics are exported over OTLP, if anywhere.
	pub otlp_endpoint: Option<String>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			database_url: "sqlite://blog.db".into(),
			host: "127.0.0.1".into(),
			port: 3000,
			jwt_secret: String::new(),
			token_ttl: Duration::hours(72),
			client_url: None,
			upload_dir: PathBuf::from("uploads"),
			max_upload_bytes: 10 * 1024 * 1024,
			google: None,
			log_level: Level::INFO,
			otlp_endpoint: None,
		}
	}
}

fn parse<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, Error> {
	match value {
		Some(value) => value.parse().map_err(|_| Error::Invalid { key, value }),
		None => Ok(default),
	}
}

/// Parses a positive number of hours that still yields a representable expiry from now.
fn token_ttl(value: Option<String>, default: Duration) -> Result<Duration, Error> {
	let Some(value) = value else {
		return Ok(default);
	};

	value
		.trim()
		.parse::<u32>()
		.ok()
		.filter(|hours| *hours > 0)
		.and_then(|hours| Duration::try_hours(hours.into()))
		.filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
		.ok_or(Error::Invalid {
			key: "TOKEN_TTL_HOURS",
			value,
		})
}

impl Config {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, Error> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads the configuration through `lookup`, treating empty values as unset.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
		let defaults = Self::default();

		let jwt_secret = var("JWT_SECRET").ok_or(Error::Missing("JWT_SECRET"))?;
		let client_url = var("CLIENT_URL").map(|url| url.trim_end_matches('/').to_owned());

		let google = match (var("GOOGLE_CLIENT_ID"), var("GOOGLE_CLIENT_SECRET")) {
			(Some(client_id), Some(client_secret)) => {
				let redirect = var("OAUTH_REDIRECT_URL")
					.ok_or(Error::Missing("OAUTH_REDIRECT_URL"))?;
				let redirect_url = match &client_url {
					Some(base) if redirect.starts_with('/') => format!("{base}{redirect}"),
					_ => redirect,
				};

				Some(GoogleConfig {
					client_id,
					client_secret,
					redirect_url,
				})
			}
			_ => None,
		};

		Ok(Self {
			database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
			host: var("HOST").unwrap_or(defaults.host),
			port: parse("PORT", var("PORT"), defaults.port)?,
			jwt_secret,
			token_ttl: token_ttl(var("TOKEN_TTL_HOURS"), defaults.token_ttl)?,
			client_url,
			upload_dir: var("UPLOAD_DIR").map_or(defaults.upload_dir, PathBuf::from),
			max_upload_bytes: parse(
				"MAX_UPLOAD_BYTES",
				var("MAX_UPLOAD_BYTES"),
				defaults.max_upload_bytes,
			)?,
			google,
			log_level: parse("LOG_LEVEL", var("LOG_LEVEL"), defaults.log_level)?,
			otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
		})
	}
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;

	use super::*;

	fn load(pairs: &[(&str, &str)]) -> Result<Config, Error> {
		let vars = pairs
			.iter()
			.map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
			.collect::<HashMap<_, _>>();

		Config::from_lookup(|key| vars.get(key).cloned())
	}

	#[test]
	fn test_requires_secret() {
		assert!(matches!(load(&[]), Err(Error::Missing("JWT_SECRET"))));
		assert!(matches!(
			load(&[("JWT_SECRET", "  ")]),
			Err(Error::Missing("JWT_SECRET"))
		));
	}

	#[test]
	fn test_defaults() {
		let config = load(&[("JWT_SECRET", "secret")]).unwrap();

		assert_eq!(config.port, 3000);
		assert_eq!(config.token_ttl, Duration::hours(72));
		assert_eq!(config.log_level, Level::INFO);
		assert!(config.google.is_none());
		assert!(config.otlp_endpoint.is_none());
	}

	#[test]
	fn test_overrides() {
		let config = load(&[
			("JWT_SECRET", "secret"),
			("PORT", "8080"),
			("TOKEN_TTL_HOURS", "1"),
			("LOG_LEVEL", "debug"),
			("CLIENT_URL", "http://localhost:5173/"),
			("GOOGLE_CLIENT_ID", "id"),
			("GOOGLE_CLIENT_SECRET", "secret"),
			("OAUTH_REDIRECT_URL", "/auth/google/callback"),
		])
		.unwrap();

		assert_eq!(config.port, 8080);
		assert_eq!(config.token_ttl, Duration::hours(1));
		assert_eq!(config.log_level, Level::DEBUG);
		assert_eq!(config.client_url.as_deref(), Some("http://localhost:5173"));
		assert_eq!(
			config.google.unwrap().redirect_url,
			"http://localhost:5173/auth/google/callback"
		);
	}

	#[test]
	fn test_invalid_number() {
		assert!(matches!(
			load(&[("JWT_SECRET", "secret"), ("PORT", "eighty")]),
			Err(Error::Invalid { key: "PORT", .. })
		));
	}

	#[test]
	fn test_invalid_token_ttl() {
		for value in ["0", "-1", "1.5", "99999999999999", "4000000000"] {
			assert!(
				matches!(
					load(&[("JWT_SECRET", "secret"), ("TOKEN_TTL_HOURS", value)]),
					Err(Error::Invalid {
						key: "TOKEN_TTL_HOURS",
						..
					})
				),
				"{value} should be rejected"
			);
		}
	}
}

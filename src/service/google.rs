use std::sync::Arc;

use serde::Deserialize;
use url::Url;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const SCOPES: &str = "openid email profile";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("request to google failed: {0}")]
	Request(#[from] reqwest::Error),
	#[error("invalid url: {0}")]
	Url(#[from] url::ParseError),
	#[error("google account email is not verified")]
	UnverifiedEmail,
}

/// OAuth client credentials registered with Google.
#[derive(Clone)]
pub struct GoogleConfig {
	pub client_id: String,
	pub client_secret: String,
	/// Where Google sends the user back to after consent.
	pub redirect_url: String,
}

/// The subset of the Google userinfo response used to sign users in.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
	pub id: String,
	pub email: String,
	#[serde(default)]
	pub verified_email: bool,
	#[serde(default)]
	pub name: String,
	pub picture: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
}

/// Runs the authorization code flow against Google.
#[derive(Clone)]
pub struct GoogleOAuth {
	config: Arc<GoogleConfig>,
	http: reqwest::Client,
}

impl GoogleOAuth {
	pub fn new(config: GoogleConfig) -> Self {
		Self {
			config: Arc::new(config),
			http: reqwest::Client::new(),
		}
	}

	/// Builds the consent page URL the user is redirected to.
	pub fn authorize_url(&self, state: &str) -> Result<Url, Error> {
		let url = Url::parse_with_params(
			AUTHORIZE_URL,
			&[
				("client_id", self.config.client_id.as_str()),
				("redirect_uri", self.config.redirect_url.as_str()),
				("response_type", "code"),
				("scope", SCOPES),
				("access_type", "online"),
				("state", state),
			],
		)?;

		Ok(url)
	}

	/// Exchanges an authorization code for the user's profile.
	pub async fn exchange(&self, code: &str) -> Result<GoogleProfile, Error> {
		let token = self
			.http
			.post(TOKEN_URL)
			.form(&[
				("code", code),
				("client_id", self.config.client_id.as_str()),
				("client_secret", self.config.client_secret.as_str()),
				("redirect_uri", self.config.redirect_url.as_str()),
				("grant_type", "authorization_code"),
			])
			.send()
			.await?
			.error_for_status()?
			.json::<TokenResponse>()
			.await?;

		let profile = self
			.http
			.get(USERINFO_URL)
			.bearer_auth(&token.access_token)
			.send()
			.await?
			.error_for_status()?
			.json::<GoogleProfile>()
			.await?;

		if !profile.verified_email {
			return Err(Error::UnverifiedEmail);
		}

		Ok(profile)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_authorize_url() {
		let google = GoogleOAuth::new(GoogleConfig {
			client_id: "client-id".into(),
			client_secret: "client-secret".into(),
			redirect_url: "http://localhost:5173/auth/google/callback".into(),
		});

		let url = google.authorize_url("some state").unwrap();
		let params = url.query_pairs().into_owned().collect::<Vec<_>>();

		assert_eq!(url.host_str(), Some("accounts.google.com"));
		assert!(params.contains(&("client_id".into(), "client-id".into())));
		assert!(params.contains(&("state".into(), "some state".into())));
		assert!(params.contains(&(
			"redirect_uri".into(),
			"http://localhost:5173/auth/google/callback".into()
		)));
		assert!(!url.as_str().contains("client-secret"));
	}
}

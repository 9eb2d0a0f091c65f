pub mod auth;
pub mod file;
pub mod google;

pub use auth::{AuthService, Authenticated};
pub use file::{FileService, StoredFile};
pub use google::{GoogleConfig, GoogleOAuth, GoogleProfile};

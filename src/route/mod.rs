pub mod auth;
pub mod category;
pub mod docs;
pub mod file;
pub mod health;
pub mod model;
pub mod post;
pub mod user;

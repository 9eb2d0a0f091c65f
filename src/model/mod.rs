pub mod category;
pub mod post;
pub mod user;

pub use category::{Category, CreateCategoryInput, UpdateCategoryInput};
pub use post::{Author, CreatePostInput, Post, UpdatePostInput};
pub use user::{AuthProvider, NewUser, RegisterInput, UpdateUserInput, User, UserChanges};

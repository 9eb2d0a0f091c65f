pub use crate::{
	model::{Category, CreateCategoryInput, UpdateCategoryInput},
	route::model::{IdPath, SlugOrIdPath},
};

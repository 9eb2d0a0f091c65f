pub use crate::{
	model::{RegisterInput, UpdateUserInput, User},
	route::model::IdPath,
};

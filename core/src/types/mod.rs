pub mod collection;
pub mod user;

pub use collection::{CollectionError, CollectionKind, NewRecipeEntry, Pinned, RecipeEntry, Saved};
pub use user::{User, UserError};

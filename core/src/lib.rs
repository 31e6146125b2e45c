pub mod database;
pub mod identity;
pub mod types;

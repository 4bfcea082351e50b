pub mod database;
pub mod extensions;
pub mod image;
pub mod server;

pub use database::FirebirdDatabaseResource;
pub use extensions::{FirebirdBuilderExt, FirebirdOptions, FirebirdServerBuilderExt};
pub use server::FirebirdServerResource;

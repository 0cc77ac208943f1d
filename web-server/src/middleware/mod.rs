// web-server/src/middleware/mod.rs
pub mod auth;

pub use auth::AuthenticatedUser;

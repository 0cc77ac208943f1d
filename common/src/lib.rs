pub mod auth;
pub mod config;
pub mod error;
pub mod messages;
pub mod models;
pub mod password;
pub mod store;
pub mod utils;

pub use auth::*;
pub use self::config::*;
pub use error::*;
pub use messages::*;
pub use password::*;
pub use utils::*;

//! HTTP API for users, tasks and chat history, mounted next to the live chat
//! channel from `websocket-server`.

pub mod api;
pub mod error;
pub mod middleware;

use actix_cors::Cors;
use actix_web::web;
use common::models::{Task, User};
use common::store::{Collection, MemoryCollection, MessageLog};
use common::{PasswordHasher, TokenService};
use std::sync::Arc;
use websocket_server::{ChatState, ConnectionRegistry};

use crate::error::ApiError;

/// Shared handles to every collaborator a request may need
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn Collection<User>>,
    pub tasks: Arc<dyn Collection<Task>>,
    pub chat: ChatState,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
}

impl AppState {
    /// State backed by in-process user and task collections
    pub fn new(tokens: TokenService, hasher: PasswordHasher, message_log: Arc<dyn MessageLog>) -> Self {
        Self {
            users: Arc::new(MemoryCollection::<User>::new()),
            tasks: Arc::new(MemoryCollection::<Task>::new()),
            chat: ChatState::new(Arc::new(ConnectionRegistry::new()), message_log),
            tokens,
            hasher,
        }
    }

    /// Register shared data, the API routes and the chat route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.clone()))
            .app_data(web::Data::new(self.chat.clone()))
            .app_data(json_config());

        api::configure(cfg);
        websocket_server::routes(cfg);
    }
}

/// Malformed JSON bodies are reported in the same shape as every other error
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

pub fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| {
            if origin == "*" {
                cors.allow_any_origin()
            } else {
                cors.allowed_origin(origin)
            }
        })
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

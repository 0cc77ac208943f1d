// web-server/src/api/messages.rs
use actix_web::{get, web, HttpResponse};

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::AppState;

/// Full chat history, oldest first
#[get("/messages")]
pub async fn get_messages(
    _auth: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let events = state.chat.message_log.read_all().await?;
    Ok(HttpResponse::Ok().json(events))
}

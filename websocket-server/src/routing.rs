// websocket-server/src/routing.rs
use actix_web::{web, HttpRequest, HttpResponse, Error};
use actix_web_actors::ws;

use crate::actors::chat_session_actor::ChatSessionActor;
use crate::registry::{ChannelHandle, ChatChannel};
use crate::ChatState;

/// Configure routes for the chat channel
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/ws/{client_id}")
            .route(web::get().to(chat_ws_route))
    );
}

/// WebSocket route for chat connections
async fn chat_ws_route(
    req: HttpRequest,
    stream: web::Payload,
    chat: web::Data<ChatState>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let client_id = path.into_inner();
    if client_id.trim().is_empty() {
        tracing::warn!("Chat connection attempt with blank client id");
        return Ok(HttpResponse::BadRequest().finish());
    }

    let session = ChatSessionActor::new(
        client_id.clone(),
        chat.registry.clone(),
        chat.message_log.clone(),
    );
    let connection_id = session.connection_id();

    // Register before the handshake response goes out, so the client is
    // reachable as soon as it sees the upgrade complete
    ws::start_with_addr(session, &req, stream).map(|(addr, resp)| {
        let channel = ChatChannel::new(client_id.clone(), connection_id, addr.recipient());

        if let Some(displaced) = chat.registry.register(&client_id, channel) {
            displaced.close();
        }

        resp
    })
}

// websocket-server/src/actors/mod.rs

pub mod chat_session_actor;

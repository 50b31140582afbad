mod activity;
mod http;
mod websocket;

pub use http::{get_client_online, get_online, health_check, publish_messages, send_info};
pub use websocket::websocket_handler;

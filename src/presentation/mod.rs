// Presentation layer - HTTP snapshot feed
pub mod app_state;
pub mod handlers;

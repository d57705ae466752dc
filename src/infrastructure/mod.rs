// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_log;
pub mod router_client;
pub mod router_xml;

// Application layer - Use cases and the ports they depend on
pub mod acquisition_client;
pub mod monitor_session;
pub mod window_buffer;

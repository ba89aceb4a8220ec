// Middleware modules
pub mod logging;

pub use logging::{request_logging, resolve_client_ip, wrap};

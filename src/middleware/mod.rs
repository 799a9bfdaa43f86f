mod auth;
mod error_handler;

pub use auth::{SESSION_COOKIE, auth_middleware, removal_cookie, session_cookie};
pub use error_handler::log_errors;

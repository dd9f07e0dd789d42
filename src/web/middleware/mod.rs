//! Middleware for the catnews HTTP layer.

mod auth;
mod cors;

pub use auth::{auth_context, AuthState, AuthUser};
pub use cors::create_cors_layer;

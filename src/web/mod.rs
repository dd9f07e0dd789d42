//! HTTP API for catnews.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::{ApiError, ErrorCode};
pub use handlers::AppState;
pub use middleware::{AuthState, AuthUser};
pub use router::{create_health_router, create_router};
pub use server::WebServer;

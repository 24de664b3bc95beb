//! HTTP API module: the route table and its middleware.

pub mod handlers;
pub mod panic;
pub mod routes;

pub use handlers::{MessageResponse, ROOT_MESSAGE};
pub use routes::create_router;

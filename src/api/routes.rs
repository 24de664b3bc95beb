//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use super::handlers::root;
use super::panic::PanicResponder;

/// Create the API router.
///
/// Only `GET /` is routed. Unknown paths get axum's default 404 and other
/// methods on `/` its default 405.
pub fn create_router(debug: bool) -> Router {
    with_middleware(Router::new().route("/", get(root)), debug)
}

/// Wrap routes in request tracing and panic recovery.
pub(crate) fn with_middleware(routes: Router, debug: bool) -> Router {
    routes.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(PanicResponder::new(debug))),
    )
}

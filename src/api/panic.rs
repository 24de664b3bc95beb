//! Turns handler panics into 500 responses.

use std::any::Any;

use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use tower_http::catch_panic::ResponseForPanic;
use tracing::error;

/// Generic body sent when debug mode is off.
pub const GENERIC_ERROR_BODY: &str = "Internal Server Error";

/// Builds the response for a panicking handler.
///
/// With `debug` set the panic message is written into the body; otherwise
/// the client only sees [`GENERIC_ERROR_BODY`].
#[derive(Debug, Clone, Copy)]
pub struct PanicResponder {
    debug: bool,
}

impl PanicResponder {
    /// Create a responder for the given mode.
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(
        &mut self,
        err: Box<dyn Any + Send + 'static>,
    ) -> Response<Self::ResponseBody> {
        let details = panic_message(err.as_ref());
        error!(panic = %details, "handler panicked");

        let body = if self.debug {
            format!(
                "{GENERIC_ERROR_BODY}\n\nThe handler panicked: {details}\n\n\
                 This page is shown because debug mode is enabled. \
                 Do not enable debug mode on a reachable host.\n"
            )
        } else {
            GENERIC_ERROR_BODY.to_string()
        };

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

/// Extract a printable message from a panic payload.
fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

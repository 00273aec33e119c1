mod http;

pub use self::http::{
    decode_envelope, from_http_error, into_ack, into_remote, AckEnvelope, ApiEnvelope, ApiResponse,
    Endpoint, HttpMethod, RemoteError, RemoteResult, UrlError, ValidatedUrl, MAX_URL_LENGTH,
};

// Render and HTTP are the only side effects this core asks the shell for.
pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
}

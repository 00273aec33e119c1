use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::records::{BidId, BookingId, RideId};

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum UrlError {
    #[error("invalid URL '{url}': {reason}")]
    Invalid { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
    scheme: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, UrlError> {
        let url = url.into();
        Self::validate(&url)?;

        let parsed = Url::parse(url.trim()).map_err(|e| Self::invalid(&url, e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| Self::invalid(&url, "URL must have a host"))?
            .to_lowercase();

        Ok(Self {
            url: parsed.to_string(),
            scheme: parsed.scheme().to_lowercase(),
            host,
        })
    }

    /// For compile-time constants that `new` is known to accept.
    pub(crate) fn trusted(url: &str, scheme: &str, host: &str) -> Self {
        Self {
            url: url.to_string(),
            scheme: scheme.to_string(),
            host: host.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Appends an absolute API path (`/rides/...`) to this base.
    pub fn join_path(&self, path: &str) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), path)
    }

    fn validate(url: &str) -> Result<(), UrlError> {
        if url.trim().is_empty() {
            return Err(Self::invalid(url, "URL cannot be empty"));
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(Self::invalid(
                url,
                format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            ));
        }

        let parsed = Url::parse(url.trim()).map_err(|e| Self::invalid(url, e.to_string()))?;

        let scheme = parsed.scheme().to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(Self::invalid(
                url,
                format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            ));
        }

        if parsed.host_str().is_none() {
            return Err(Self::invalid(url, "URL must have a host"));
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(Self::invalid(url, "credentials in URL are not allowed"));
        }

        Ok(())
    }

    fn invalid(url: &str, reason: impl Into<String>) -> UrlError {
        UrlError::Invalid {
            url: Self::truncate_url(url),
            reason: reason.into(),
        }
    }

    fn truncate_url(url: &str) -> String {
        match url.char_indices().nth(100) {
            Some((idx, _)) => format!("{}...", &url[..idx]),
            None => url.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Every backend route the core talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    DriverRides,
    DriverBids,
    PassengerBookings,
    PassengerRequests,
    AcceptBid(BidId),
    RejectBid(BidId),
    CancelRide(RideId),
    CancelBooking(BookingId),
    CreateRide,
    CreateRequest,
    CreateBid,
}

impl Endpoint {
    pub fn method(&self) -> HttpMethod {
        match self {
            Endpoint::DriverRides
            | Endpoint::DriverBids
            | Endpoint::PassengerBookings
            | Endpoint::PassengerRequests => HttpMethod::Get,
            Endpoint::AcceptBid(_) | Endpoint::RejectBid(_) => HttpMethod::Patch,
            Endpoint::CancelRide(_) | Endpoint::CancelBooking(_) => HttpMethod::Delete,
            Endpoint::CreateRide | Endpoint::CreateRequest | Endpoint::CreateBid => HttpMethod::Post,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::DriverRides => "/rides/driver/my-rides".into(),
            Endpoint::DriverBids => "/bids/driver/my-bids".into(),
            Endpoint::PassengerBookings => "/bookings/my-bookings".into(),
            Endpoint::PassengerRequests => "/requests/passenger/my-requests".into(),
            Endpoint::AcceptBid(id) => format!("/bids/{}/accept", encode_segment(id.as_str())),
            Endpoint::RejectBid(id) => format!("/bids/{}/reject", encode_segment(id.as_str())),
            Endpoint::CancelRide(id) => format!("/rides/{}", encode_segment(id.as_str())),
            Endpoint::CancelBooking(id) => format!("/bookings/{}", encode_segment(id.as_str())),
            Endpoint::CreateRide => "/rides".into(),
            Endpoint::CreateRequest => "/requests".into(),
            Endpoint::CreateBid => "/bids".into(),
        }
    }
}

/// Ids come from the server, but they still end up inside a path.
fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum RemoteError {
    #[error("transport error: {detail}")]
    Transport { detail: String },

    #[error("request rejected by server{}", message_suffix(.message))]
    Rejected { message: Option<String> },

    #[error("response carried no data")]
    MissingData,

    #[error("invalid response: {detail}")]
    Decode { detail: String },
}

impl RemoteError {
    /// Text the backend wants the user to see, if it sent any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RemoteError::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Transport { .. })
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// `{ success, data, message }`, the shape of every backend response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn into_data(self) -> RemoteResult<T> {
        if !self.success {
            return Err(RemoteError::Rejected {
                message: self.message,
            });
        }
        self.data.ok_or(RemoteError::MissingData)
    }

    pub fn into_ack(self) -> RemoteResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(RemoteError::Rejected {
                message: self.message,
            })
        }
    }
}

/// Envelope for mutating calls; whatever `data` holds is ignored.
pub type AckEnvelope = ApiEnvelope<IgnoredAny>;

pub type ApiResponse<T> = crux_http::Result<crux_http::Response<ApiEnvelope<T>>>;

/// Decodes an envelope from raw bytes, e.g. the body of a 4xx/5xx reply.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> RemoteResult<ApiEnvelope<T>> {
    serde_json::from_slice(body).map_err(|e| RemoteError::Decode {
        detail: format!("failed to parse JSON: {e}"),
    })
}

/// Non-2xx replies still carry the backend's envelope; its message is kept.
pub fn from_http_error(error: crux_http::Error) -> RemoteError {
    match error {
        crux_http::Error::Http(http) => {
            let envelope = http
                .body
                .as_deref()
                .and_then(|body| decode_envelope::<IgnoredAny>(body).ok());
            match envelope {
                Some(envelope) => RemoteError::Rejected {
                    message: envelope.message,
                },
                None => RemoteError::Transport {
                    detail: format!("HTTP error {}", http.code),
                },
            }
        }
        crux_http::Error::Json(detail) => RemoteError::Decode { detail },
        other => RemoteError::Transport {
            detail: other.to_string(),
        },
    }
}

fn take_envelope<T>(result: ApiResponse<T>) -> RemoteResult<ApiEnvelope<T>> {
    let mut response = result.map_err(from_http_error)?;
    response.take_body().ok_or_else(|| RemoteError::Decode {
        detail: "empty response body".into(),
    })
}

/// Collapses transport and envelope failures into one domain result.
pub fn into_remote<T: DeserializeOwned>(result: ApiResponse<T>) -> RemoteResult<T> {
    take_envelope(result)?.into_data()
}

pub fn into_ack(result: ApiResponse<IgnoredAny>) -> RemoteResult<()> {
    take_envelope(result)?.into_ack()
}

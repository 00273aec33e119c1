use crate::capabilities::{Endpoint, UrlError, ValidatedUrl};

pub const DEFAULT_BASE_URL: &str = "https://api.rideclub.app/api/v1";
const DEFAULT_HOST: &str = "api.rideclub.app";

/// Where the backend lives. Replaced wholesale by `Event::Configure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: ValidatedUrl,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, UrlError> {
        Ok(Self {
            base_url: ValidatedUrl::new(base_url)?,
        })
    }

    pub fn base_url(&self) -> &ValidatedUrl {
        &self.base_url
    }

    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        self.base_url.join_path(&endpoint.path())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: ValidatedUrl::trusted(DEFAULT_BASE_URL, "https", DEFAULT_HOST),
        }
    }
}

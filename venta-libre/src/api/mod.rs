//! Thin client for the Venta Libre REST API.
//!
//! One request per call against a fixed base URL. Non-2xx responses and
//! transport failures come back as `ApiError`; nothing is retried.

mod endpoints;

pub use endpoints::Created;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    /// The server answered outside the 2xx range.
    #[snafu(display("HTTP {status}: {status_text}"))]
    Status { status: u16, status_text: String },

    /// DNS, refused connection, reset... No status is available.
    #[snafu(display("Error de red al pedir {url}: {source}"))]
    Network { url: String, source: reqwest::Error },

    #[snafu(display("Respuesta inválida de {url}: {source}"))]
    Decode { url: String, source: serde_json::Error },

    #[snafu(display("Cuerpo inválido: {source}"))]
    Encode { source: serde_json::Error },
}

impl ApiError {
    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Per-call extras.
#[derive(Debug, Default, Clone)]
pub struct RequestOptions {
    /// Merged over the default headers; a caller header replaces a default
    /// with the same name.
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn json<T: Serialize>(body: &T) -> Result<Self, ApiError> {
        Ok(Self {
            headers: HeaderMap::new(),
            body: Some(serde_json::to_value(body).context(EncodeSnafu)?),
        })
    }

    pub fn header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Headers every request carries before the caller's are merged in.
    pub fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Issue one request and return the parsed JSON body. An empty body
    /// parses as `null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.url(path);

        let mut headers = Self::default_headers();
        for (name, value) in options.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        let mut request = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = &options.body {
            let bytes = serde_json::to_vec(body).context(EncodeSnafu)?;
            request = request.body(bytes);
        }

        tracing::debug!(%method, %url, "api request");
        let response = request.send().await.context(NetworkSnafu { url: url.clone() })?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(%method, %url, status = status.as_u16(), "api request failed");
            return Err(status_error(status));
        }

        let bytes = response.bytes().await.context(NetworkSnafu { url: url.clone() })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes).context(DecodeSnafu { url })
    }

    /// `request` followed by decoding into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let value = self.request(method, path, options).await?;
        serde_json::from_value(value).context(DecodeSnafu { url })
    }
}

fn status_error(status: StatusCode) -> ApiError {
    ApiError::Status {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slashes() {
        let client = HttpClient::new("http://localhost:3000/api/v1/");
        assert_eq!(client.base_url(), "http://localhost:3000/api/v1");
        assert_eq!(client.url("/users"), "http://localhost:3000/api/v1/users");
        assert_eq!(client.url("users/3"), "http://localhost:3000/api/v1/users/3");
    }

    #[test]
    fn test_status_error_message_carries_status() {
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
    }

    #[test]
    fn test_default_headers_are_json() {
        let headers = HttpClient::default_headers();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }
}

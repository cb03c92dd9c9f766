//! HTTP client for the marketplace backend.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned, de::IgnoredAny};
use tracing::debug;

use crate::{
    api::{ApiError, wire::Envelope},
    session::Session,
};

/// Configuration for connecting to the marketplace backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend base URL, e.g. `"https://api.bazaar.example"`.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// JSON-over-HTTP client shared by the domain services.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Start a `POST` to `path` with a JSON body, authenticated when a session is given.
    pub(crate) fn post<B>(&self, path: &str, session: Option<&Session>, body: &B) -> RequestBuilder
    where
        B: Serialize + ?Sized,
    {
        let request = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body);

        match session {
            Some(session) if session.is_authenticated() => request.bearer_auth(session.bearer()),
            _ => request,
        }
    }

    /// Send a request and return the payload of its envelope.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, an error
    /// envelope, or an undecodable body.
    pub(crate) async fn fetch<T>(&self, request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let body = Self::send(request).await?;

        read_envelope::<T>(&body)?.into_payload()
    }

    /// Send a request whose success payload is ignored.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub(crate) async fn acknowledge(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let body = Self::send(request).await?;

        read_envelope::<IgnoredAny>(&body)?.into_ack()
    }

    async fn send(request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.bytes().await?.to_vec();

        debug!(%status, path = %url, bytes = body.len(), "api response");

        if status.is_success() {
            return Ok(body);
        }

        if let Some(error) = error_body(&body) {
            return Err(error);
        }

        Err(ApiError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Decode an envelope, falling back to the server's error details when the
/// payload does not match the expected shape.
fn read_envelope<T>(body: &[u8]) -> Result<Envelope<T>, ApiError>
where
    T: DeserializeOwned,
{
    match serde_json::from_slice::<Envelope<T>>(body) {
        Ok(envelope) => Ok(envelope),
        Err(decode_error) => Err(error_body(body).unwrap_or(ApiError::Decode(decode_error))),
    }
}

/// The server's error details, if the body carries any.
fn error_body(body: &[u8]) -> Option<ApiError> {
    serde_json::from_slice::<Envelope<IgnoredAny>>(body)
        .ok()?
        .error
        .map(Into::into)
}

//! HTTP client for the sales backend
//!
//! Every endpoint answers with the [`ApiResponse`] envelope. Non-2xx
//! responses are decoded into that envelope when the body carries one,
//! otherwise they are mapped by status code.

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiResponse;

/// Network HTTP client with bearer authentication
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Base URL without the trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Join path segments relative to the base URL, percent-encoding each one
    pub fn path(&self, segments: &[&str]) -> ClientResult<String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidResponse(format!("bad base url: {}", e)))?;
        let prefix = url.path().trim_end_matches('/').len();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidResponse("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.path()[prefix..].trim_start_matches('/').to_string())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.authorize(self.client.get(self.url(path)));
        Self::expect_data(path, request).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        Self::expect_data(path, request).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.authorize(self.client.post(self.url(path)));
        Self::expect_data(path, request).await
    }

    /// POST whose success envelope carries no data
    pub async fn post_ack<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<()> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        Self::send::<serde_json::Value>(path, request).await.map(|_| ())
    }

    async fn expect_data<T: DeserializeOwned>(path: &str, request: RequestBuilder) -> ClientResult<T> {
        Self::send(path, request)
            .await?
            .ok_or_else(|| ClientError::InvalidResponse(format!("{}: missing data", path)))
    }

    async fn send<T: DeserializeOwned>(path: &str, request: RequestBuilder) -> ClientResult<Option<T>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(path = %path, status = %status, "Backend response");
        decode_envelope(status, &body)
    }
}

/// Decode a response body into the envelope's data
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> ClientResult<Option<T>> {
    if !status.is_success() {
        if let Ok(envelope) = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
            && !envelope.is_success()
        {
            return Err(ClientError::Api {
                code: envelope.code,
                message: envelope.message,
            });
        }
        let text = body.trim().to_string();
        return Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(text)
            }
            _ => ClientError::Internal(format!("{}: {}", status, text)),
        });
    }

    if body.trim().is_empty() {
        return Ok(None);
    }
    let envelope: ApiResponse<T> = serde_json::from_str(body)?;
    if !envelope.is_success() {
        return Err(ClientError::Api {
            code: envelope.code,
            message: envelope.message,
        });
    }
    Ok(envelope.data)
}

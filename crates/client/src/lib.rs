//! Pure HTTP invocation over the process's single shared client (§4.3).
//!
//! Two `reqwest::Client` instances are kept: one following redirects (for
//! real dispatch calls) and one that never does (for connectivity probes,
//! per §4.4's "following no redirects").

use std::collections::HashMap;
use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::{header::HeaderMap, StatusCode};
use serde_json::Value;

pub mod error;
pub use error::{ClientError, ClientResult};

pub type LineStream = Pin<Box<dyn Stream<Item = ClientResult<String>> + Send>>;

#[derive(Clone)]
pub struct UpstreamClient {
    following: reqwest::Client,
    no_redirect: reqwest::Client,
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

impl UpstreamClient {
    pub fn new() -> Self {
        let following = reqwest::Client::builder()
            .build()
            .expect("reqwest client with default redirect policy");
        let no_redirect = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("reqwest client with redirects disabled");
        Self { following, no_redirect }
    }

    fn build_headers(headers: &HashMap<String, String>) -> ClientResult<HeaderMap> {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            let name = reqwest::header::HeaderName::from_bytes(k.as_bytes())
                .map_err(|_| ClientError::InvalidHeader(k.clone()))?;
            let value = reqwest::header::HeaderValue::from_str(v)
                .map_err(|_| ClientError::InvalidHeader(k.clone()))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// A single unary call. Redirects are followed (this is not a probe).
    pub async fn post_json(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: &Value,
        timeout: Duration,
    ) -> ClientResult<(StatusCode, bytes::Bytes)> {
        let resp = self
            .following
            .post(url)
            .headers(Self::build_headers(headers)?)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        Ok((status, bytes))
    }

    /// A plain GET, used by Upstream Model Discovery (§4.5) against
    /// endpoints like `/v1/models` or `/api/tags` that take no body.
    pub async fn get_json(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> ClientResult<(StatusCode, bytes::Bytes)> {
        let resp = self.following.get(url).headers(Self::build_headers(headers)?).timeout(timeout).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        Ok((status, bytes))
    }

    /// A probe call: redirects are never followed, per §4.3/§4.4.
    pub async fn post_json_no_redirect(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: &Value,
        timeout: Duration,
    ) -> ClientResult<StatusCode> {
        let result = self
            .no_redirect
            .post(url)
            .headers(Self::build_headers(headers)?)
            .timeout(timeout)
            .json(body)
            .send()
            .await;
        match result {
            Ok(resp) => Ok(resp.status()),
            Err(e) => Err(ClientError::Transport(e)),
        }
    }

    /// Opens a streaming POST; the returned stream yields newline-delimited
    /// strings with trailing CR/LF stripped and blank lines dropped.
    pub async fn open_stream(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: &Value,
        timeout: Duration,
    ) -> ClientResult<(StatusCode, LineStream)> {
        let resp = self
            .following
            .post(url)
            .headers(Self::build_headers(headers)?)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;
        let status = resp.status();

        let mut byte_stream = resp.bytes_stream();
        let stream = async_stream::stream! {
            let mut buffer = String::new();
            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(ClientError::Transport(e));
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(pos) = buffer.find('\n') {
                    let line: String = buffer.drain(..=pos).collect();
                    let trimmed = line.trim_end_matches(['\r', '\n']);
                    if !trimmed.is_empty() {
                        yield Ok(trimmed.to_string());
                    }
                }
            }
            let tail = buffer.trim();
            if !tail.is_empty() {
                yield Ok(tail.to_string());
            }
        };

        Ok((status, Box::pin(stream)))
    }
}

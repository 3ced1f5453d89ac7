// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Client side of the legacy HTTP+SSE transport.
//!
//! The server streams JSON-RPC messages as SSE events on a long-lived GET. Its first `endpoint`
//! event names the URL to POST client messages to.

use std::future::Future;

use futures::stream::BoxStream;
use futures::StreamExt;
use http::Uri;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use rmcp::service::{RoleClient, TxJsonRpcMessage};
use rmcp::transport::Transport;
use sse_stream::{Error as SseError, Sse, SseStream};

const EVENT_STREAM_MIME: &str = "text/event-stream";

#[derive(Debug, thiserror::Error)]
pub enum SseTransportError {
    #[error("sse stream: {0}")]
    Sse(#[from] SseError),

    #[error("http: {0}")]
    Client(#[from] reqwest::Error),

    #[error("stream ended before the server announced its message endpoint")]
    UnexpectedEndOfStream,

    #[error("unexpected content type: {0:?}")]
    UnexpectedContentType(Option<String>),

    #[error("invalid uri: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    #[error("invalid uri parts: {0}")]
    InvalidUriParts(#[from] http::uri::InvalidUriParts),
}

pub struct SseClientTransport {
    client: reqwest::Client,
    message_endpoint: Uri,
    stream: Option<BoxStream<'static, Result<Sse, SseError>>>,
}

impl SseClientTransport {
    /// Opens the event stream at `url` and waits for the `endpoint` event.
    pub async fn connect(client: reqwest::Client, url: &str) -> Result<Self, SseTransportError> {
        let sse_endpoint = url.parse::<Uri>()?;
        let mut stream = open_stream(&client, &sse_endpoint).await?;

        let message_endpoint = loop {
            let event = stream.next().await.ok_or(SseTransportError::UnexpectedEndOfStream)??;
            if event.event.as_deref() != Some("endpoint") {
                continue;
            }
            break message_endpoint(&sse_endpoint, event.data.as_deref().unwrap_or_default())?;
        };
        tracing::debug!(%message_endpoint, "sse message endpoint");

        Ok(Self { client, message_endpoint, stream: Some(stream) })
    }
}

impl Transport<RoleClient> for SseClientTransport {
    type Error = SseTransportError;

    fn send(
        &mut self,
        item: TxJsonRpcMessage<RoleClient>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        let client = self.client.clone();
        let uri = self.message_endpoint.to_string();
        async move { post_message(&client, &uri, &item).await }
    }

    async fn receive(&mut self) -> Option<ServerJsonRpcMessage> {
        let stream = self.stream.as_mut()?;
        loop {
            match stream.next().await? {
                Ok(event) => {
                    let Some(data) = event.data else {
                        continue;
                    };
                    match serde_json::from_str::<ServerJsonRpcMessage>(&data) {
                        Ok(message) => return Some(message),
                        Err(err) => tracing::debug!(%err, "skipping unparseable sse event"),
                    }
                }
                Err(err) => {
                    tracing::debug!(%err, "sse stream failed");
                    return None;
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        self.stream.take();
        Ok(())
    }
}

async fn open_stream(
    client: &reqwest::Client,
    uri: &Uri,
) -> Result<BoxStream<'static, Result<Sse, SseError>>, SseTransportError> {
    let response = client
        .get(uri.to_string())
        .header(ACCEPT, EVENT_STREAM_MIME)
        .send()
        .await?
        .error_for_status()?;

    let content_type = response.headers().get(CONTENT_TYPE).map(|value| value.as_bytes());
    match content_type {
        Some(value) if value.starts_with(EVENT_STREAM_MIME.as_bytes()) => {}
        other => {
            return Err(SseTransportError::UnexpectedContentType(
                other.map(|value| String::from_utf8_lossy(value).into_owned()),
            ))
        }
    }

    Ok(SseStream::from_byte_stream(response.bytes_stream()).boxed())
}

async fn post_message(
    client: &reqwest::Client,
    uri: &str,
    message: &ClientJsonRpcMessage,
) -> Result<(), SseTransportError> {
    client.post(uri).json(message).send().await?.error_for_status()?;
    Ok(())
}

/// Resolves the announced endpoint against the stream URL.
///
/// Absolute URLs are used as is, `?query` keeps the stream path, anything else replaces the path.
fn message_endpoint(base: &Uri, endpoint: &str) -> Result<Uri, SseTransportError> {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return Ok(endpoint.parse()?);
    }

    let mut parts = base.clone().into_parts();
    let path_and_query = if endpoint.starts_with('?') {
        let path = parts.path_and_query.as_ref().map(|pq| pq.path()).unwrap_or("/");
        format!("{path}{endpoint}")
    } else if endpoint.starts_with('/') {
        endpoint.to_owned()
    } else {
        format!("/{endpoint}")
    };
    parts.path_and_query = Some(path_and_query.parse()?);
    Ok(Uri::from_parts(parts)?)
}

#[cfg(test)]
mod tests {
    use super::message_endpoint;
    use http::Uri;

    fn base() -> Uri {
        "http://localhost:8080/sse?token=1".parse().expect("uri")
    }

    #[test]
    fn absolute_endpoints_replace_the_base() {
        let uri = message_endpoint(&base(), "https://other/messages").expect("endpoint");
        assert_eq!(uri.to_string(), "https://other/messages");
    }

    #[test]
    fn relative_paths_keep_scheme_and_authority() {
        let uri = message_endpoint(&base(), "/messages?session=abc").expect("endpoint");
        assert_eq!(uri.to_string(), "http://localhost:8080/messages?session=abc");

        let uri = message_endpoint(&base(), "messages").expect("endpoint");
        assert_eq!(uri.to_string(), "http://localhost:8080/messages");
    }

    #[test]
    fn query_only_endpoints_keep_the_stream_path() {
        let uri = message_endpoint(&base(), "?session=abc").expect("endpoint");
        assert_eq!(uri.to_string(), "http://localhost:8080/sse?session=abc");
    }

    #[test]
    fn malformed_endpoints_are_errors() {
        assert!(message_endpoint(&base(), "/bad path").is_err());
    }
}

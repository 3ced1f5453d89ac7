// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::process::Stdio;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use rmcp::model::{
    CallToolRequestParams, Content, RawContent, ReadResourceRequestParams, ResourceContents,
};
use rmcp::service::{RoleClient, RunningService, ServiceExt};
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::transport::{StreamableHttpClientTransport, TokioChildProcess};
use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, Command};

use super::sse::SseClientTransport;
use super::{ConnectionTarget, Remote, RemoteError};
use crate::model::{ContentItem, Operation, PromptDescriptor, Resource, ToolReply};

/// A connected MCP client session.
pub struct McpRemote {
    service: RunningService<RoleClient, ()>,
}

impl McpRemote {
    /// Connects and performs the MCP initialize handshake.
    pub async fn connect(target: &ConnectionTarget) -> Result<Self, RemoteError> {
        let transport_name = target.transport_name();
        let connect_err =
            |err: &dyn std::fmt::Display| RemoteError::Connect {
                transport: transport_name,
                reason: err.to_string(),
            };

        let service = match target {
            ConnectionTarget::Stdio { command, env } => {
                let mut parts = command.split_whitespace();
                let program = parts.next().ok_or(RemoteError::EmptyCommand)?;
                let mut cmd = Command::new(program);
                cmd.args(parts);
                for (key, value) in env {
                    cmd.env(key, value);
                }

                let (transport, stderr) = TokioChildProcess::builder(cmd)
                    .stderr(Stdio::piped())
                    .spawn()
                    .map_err(|err| RemoteError::Spawn(err.to_string()))?;
                if let Some(stderr) = stderr {
                    tokio::spawn(forward_stderr(stderr));
                }

                ().serve(transport).await.map_err(|err| connect_err(&err))?
            }
            ConnectionTarget::Sse { url, headers } => {
                let client = http_client(headers)?;
                let transport = SseClientTransport::connect(client, url)
                    .await
                    .map_err(|err| connect_err(&err))?;
                ().serve(transport).await.map_err(|err| connect_err(&err))?
            }
            ConnectionTarget::Http { url, headers } => {
                let client = http_client(headers)?;
                let transport = StreamableHttpClientTransport::with_client(
                    client,
                    StreamableHttpClientTransportConfig::with_uri(url.clone()),
                );
                ().serve(transport).await.map_err(|err| connect_err(&err))?
            }
        };

        let remote = Self { service };
        tracing::info!(
            transport = transport_name,
            server = remote.server_label().as_deref().unwrap_or("unknown"),
            "connected"
        );
        Ok(remote)
    }

    /// `name version` of the connected server, when it reported one.
    pub fn server_label(&self) -> Option<String> {
        self.service
            .peer_info()
            .map(|info| format!("{} {}", info.server_info.name, info.server_info.version))
    }

    /// Closes the session, terminating a spawned server process.
    pub async fn close(self) {
        if let Err(err) = self.service.cancel().await {
            tracing::debug!(?err, "closing MCP session failed");
        }
    }
}

#[async_trait]
impl Remote for McpRemote {
    async fn list_operations(&self) -> Result<Vec<Operation>, RemoteError> {
        let tools = self.service.list_all_tools().await?;
        Ok(tools
            .into_iter()
            .map(|tool| {
                Operation::from_input_schema(
                    tool.name.to_string(),
                    tool.description.as_deref().unwrap_or_default(),
                    &tool.input_schema,
                )
            })
            .collect())
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, RemoteError> {
        let resources = self.service.list_all_resources().await?;
        Ok(resources
            .into_iter()
            .map(|resource| {
                Resource::new(
                    resource.name.clone(),
                    resource.description.clone().unwrap_or_default(),
                    resource.uri.clone(),
                )
                .with_mime_type(resource.mime_type.clone())
            })
            .collect())
    }

    async fn list_prompts(&self) -> Result<Vec<PromptDescriptor>, RemoteError> {
        let prompts = self.service.list_all_prompts().await?;
        Ok(prompts
            .into_iter()
            .map(|prompt| {
                let arguments = prompt
                    .arguments
                    .unwrap_or_default()
                    .into_iter()
                    .map(|argument| argument.name)
                    .collect();
                PromptDescriptor::new(prompt.name, prompt.description.unwrap_or_default())
                    .with_arguments(arguments)
            })
            .collect())
    }

    async fn invoke(
        &self,
        operation: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolReply, RemoteError> {
        let result = self
            .service
            .call_tool(CallToolRequestParams {
                meta: None,
                name: operation.to_owned().into(),
                arguments: Some(arguments),
                task: None,
            })
            .await?;

        let mut content = result.content.iter().map(content_item).collect::<Vec<_>>();
        if content.is_empty() {
            if let Some(structured) = result.structured_content {
                content.push(ContentItem::Json {
                    kind: "structured".to_owned(),
                    value: structured,
                });
            }
        }

        Ok(ToolReply { is_error: result.is_error.unwrap_or(false), content })
    }

    async fn read_resource(&self, locator: &str) -> Result<Vec<ContentItem>, RemoteError> {
        let result = self
            .service
            .read_resource(ReadResourceRequestParams { meta: None, uri: locator.to_owned() })
            .await?;
        Ok(result.contents.iter().map(resource_item).collect())
    }
}

fn content_item(content: &Content) -> ContentItem {
    let kind = match &content.raw {
        RawContent::Text(text) => return ContentItem::Text(text.text.clone()),
        RawContent::Image(_) => "image",
        RawContent::Resource(_) => "resource",
        _ => "content",
    };

    match serde_json::to_value(content) {
        Ok(value) => {
            let kind = value.get("type").and_then(Value::as_str).unwrap_or(kind).to_owned();
            ContentItem::Json { kind, value }
        }
        Err(_) => ContentItem::Unsupported { kind: kind.to_owned() },
    }
}

fn resource_item(contents: &ResourceContents) -> ContentItem {
    match serde_json::to_value(contents) {
        Ok(value) => ContentItem::Json { kind: "resource".to_owned(), value },
        Err(_) => ContentItem::Unsupported { kind: "resource".to_owned() },
    }
}

fn http_client(headers: &[(String, String)]) -> Result<reqwest::Client, RemoteError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let invalid = |reason: String| RemoteError::InvalidHeader { name: name.clone(), reason };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|err| invalid(err.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|err| invalid(err.to_string()))?;
        map.append(header_name, header_value);
    }

    reqwest::Client::builder()
        .default_headers(map)
        .build()
        .map_err(|err| RemoteError::Transport(err.to_string()))
}

async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => tracing::debug!(target: "triton::server_stderr", "{line}"),
            Ok(None) => break,
            Err(err) => {
                tracing::debug!(%err, "server stderr closed");
                break;
            }
        }
    }
}

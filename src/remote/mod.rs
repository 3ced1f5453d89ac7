// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The remote tool-providing service.
//!
//! Everything the session needs from a server goes through the [`Remote`] trait: catalog
//! listings plus the two asynchronous calls (tool invocation and resource read). [`McpRemote`]
//! implements it over an `rmcp` client session; [`DemoRemote`] is an in-process server used by
//! `triton demo` and by tests.

pub mod demo;
pub mod mcp;
pub mod sse;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{ContentItem, Operation, PromptDescriptor, Resource, ToolReply};

pub use demo::DemoRemote;
pub use mcp::McpRemote;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("empty server command")]
    EmptyCommand,

    #[error("failed to spawn server process: {0}")]
    Spawn(String),

    #[error("failed to connect over {transport}: {reason}")]
    Connect { transport: &'static str, reason: String },

    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("service error: {0}")]
    Service(#[from] rmcp::service::ServiceError),

    #[error("{0}")]
    Transport(String),
}

#[async_trait]
pub trait Remote: Send + Sync {
    async fn list_operations(&self) -> Result<Vec<Operation>, RemoteError>;

    async fn list_resources(&self) -> Result<Vec<Resource>, RemoteError>;

    async fn list_prompts(&self) -> Result<Vec<PromptDescriptor>, RemoteError>;

    async fn invoke(
        &self,
        operation: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolReply, RemoteError>;

    async fn read_resource(&self, locator: &str) -> Result<Vec<ContentItem>, RemoteError>;
}

/// How to reach the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// Spawn a local process and speak MCP over its stdio.
    Stdio { command: String, env: Vec<(String, String)> },
    /// Legacy HTTP+SSE endpoint.
    Sse { url: String, headers: Vec<(String, String)> },
    /// Streamable HTTP endpoint.
    Http { url: String, headers: Vec<(String, String)> },
}

impl ConnectionTarget {
    pub fn transport_name(&self) -> &'static str {
        match self {
            Self::Stdio { .. } => "stdio",
            Self::Sse { .. } => "sse",
            Self::Http { .. } => "streamable http",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Stdio { command, .. } => format!("stdio: {command}"),
            Self::Sse { url, .. } => format!("sse: {url}"),
            Self::Http { url, .. } => format!("http: {url}"),
        }
    }
}

/// Parses `KEY=VALUE`. Entries without `=` or with an empty key are rejected.
pub fn parse_env_pair(raw: &str) -> Option<(String, String)> {
    let (key, value) = raw.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    Some((key.to_owned(), value.to_owned()))
}

/// Parses `Name: value`, trimming both sides. Entries without `:` are rejected.
pub fn parse_header(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_owned(), value.trim().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::{parse_env_pair, parse_header, ConnectionTarget};

    #[test]
    fn env_pairs_split_on_first_equals() {
        assert_eq!(parse_env_pair("A=b=c"), Some(("A".into(), "b=c".into())));
        assert_eq!(parse_env_pair("EMPTY="), Some(("EMPTY".into(), String::new())));
        assert_eq!(parse_env_pair("=x"), None);
        assert_eq!(parse_env_pair("novalue"), None);
    }

    #[test]
    fn headers_are_trimmed_and_require_colon() {
        assert_eq!(
            parse_header(" Authorization :  Bearer abc "),
            Some(("Authorization".into(), "Bearer abc".into()))
        );
        assert_eq!(parse_header("X-Url: http://a:1"), Some(("X-Url".into(), "http://a:1".into())));
        assert_eq!(parse_header("missing"), None);
        assert_eq!(parse_header(": value"), None);
    }

    #[test]
    fn targets_describe_themselves() {
        let target = ConnectionTarget::Http { url: "http://localhost/mcp".into(), headers: vec![] };
        assert_eq!(target.transport_name(), "streamable http");
        assert_eq!(target.describe(), "http: http://localhost/mcp");
    }
}

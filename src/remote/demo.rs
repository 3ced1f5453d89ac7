// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-process server backing `triton demo` and the test suites.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{Remote, RemoteError};
use crate::model::{
    CatalogSnapshot, ContentItem, Operation, ParamType, Parameter, PromptDescriptor, Resource,
    ToolReply,
};

type ToolHandler = Arc<dyn Fn(&Map<String, Value>) -> Result<ToolReply, RemoteError> + Send + Sync>;

/// A recorded call against the demo server.
#[derive(Debug, Clone, PartialEq)]
pub enum DemoCall {
    Invoke { operation: String, arguments: Map<String, Value> },
    Read { locator: String },
}

#[derive(Clone, Default)]
pub struct DemoRemote {
    catalog: CatalogSnapshot,
    handlers: BTreeMap<String, ToolHandler>,
    resources: BTreeMap<String, Result<Vec<ContentItem>, String>>,
    listing_failure: Option<String>,
    latency: Option<Duration>,
    calls: Arc<Mutex<Vec<DemoCall>>>,
}

impl std::fmt::Debug for DemoRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoRemote")
            .field("catalog", &self.catalog)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("listing_failure", &self.listing_failure)
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl DemoRemote {
    pub fn new(catalog: CatalogSnapshot) -> Self {
        Self { catalog, ..Self::default() }
    }

    /// Replies to `operation` with the result of `handler`. Unhandled operations echo their
    /// arguments back as JSON text.
    pub fn with_tool<F>(mut self, operation: &str, handler: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Result<ToolReply, RemoteError> + Send + Sync + 'static,
    {
        self.handlers.insert(operation.to_owned(), Arc::new(handler));
        self
    }

    pub fn with_resource(mut self, locator: &str, contents: Vec<ContentItem>) -> Self {
        self.resources.insert(locator.to_owned(), Ok(contents));
        self
    }

    pub fn with_broken_resource(mut self, locator: &str, reason: &str) -> Self {
        self.resources.insert(locator.to_owned(), Err(reason.to_owned()));
        self
    }

    /// Makes every catalog listing fail.
    pub fn with_listing_failure(mut self, reason: &str) -> Self {
        self.listing_failure = Some(reason.to_owned());
        self
    }

    /// Delays every tool call and resource read.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<DemoCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// A small arithmetic and text server.
    pub fn sample() -> Self {
        let number = |name: &str, description: &str| {
            Parameter::new(name, ParamType::Number, description, true)
        };
        let operations = vec![
            Operation::new(
                "add",
                "Add two numbers",
                vec![number("a", "first addend"), number("b", "second addend")],
            ),
            Operation::new("ping", "Check that the server answers", Vec::new()),
            Operation::new(
                "echo",
                "Echo a message, optionally shouting",
                vec![
                    Parameter::new("message", ParamType::String, "text to echo", true),
                    Parameter::new("shout", ParamType::Boolean, "uppercase the reply", false),
                    Parameter::new("times", ParamType::Integer, "repeat count", false),
                ],
            ),
            Operation::new("fail", "Always reports an error", Vec::new()),
        ];
        let resources = vec![
            Resource::new("readme", "Demo server notes", "demo://readme")
                .with_mime_type(Some("text/plain".to_owned())),
            Resource::new("config", "Server configuration as JSON", "demo://config")
                .with_mime_type(Some("application/json".to_owned())),
            Resource::new("missing", "A resource that cannot be read", "demo://missing"),
        ];
        let prompts = vec![
            PromptDescriptor::new("greet", "Greet someone by name")
                .with_arguments(vec!["name".to_owned()]),
            PromptDescriptor::new("summarize", "Summarize a document")
                .with_arguments(vec!["text".to_owned(), "style".to_owned()]),
        ];

        Self::new(CatalogSnapshot::new(operations, resources, prompts))
            .with_tool("add", |args| {
                let a = args.get("a").and_then(Value::as_f64).unwrap_or_default();
                let b = args.get("b").and_then(Value::as_f64).unwrap_or_default();
                Ok(text_reply(format!("{}", a + b)))
            })
            .with_tool("ping", |_| Ok(text_reply("pong")))
            .with_tool("echo", |args| {
                let message = args.get("message").and_then(Value::as_str).unwrap_or_default();
                let message = if args.get("shout").and_then(Value::as_bool).unwrap_or(false) {
                    message.to_uppercase()
                } else {
                    message.to_owned()
                };
                let times = args.get("times").and_then(Value::as_i64).unwrap_or(1).clamp(1, 16);
                let lines = vec![message; times as usize];
                Ok(text_reply(lines.join("\n")))
            })
            .with_tool("fail", |_| {
                Ok(ToolReply {
                    is_error: true,
                    content: vec![ContentItem::Text("the demo server refuses".to_owned())],
                })
            })
            .with_resource(
                "demo://readme",
                vec![ContentItem::Text("Triton demo server.\nTry the add tool.".to_owned())],
            )
            .with_resource(
                "demo://config",
                vec![ContentItem::Json {
                    kind: "resource".to_owned(),
                    value: json!({"uri": "demo://config", "text": "{\"debug\":true}"}),
                }],
            )
            .with_broken_resource("demo://missing", "resource not found: demo://missing")
    }

    fn record(&self, call: DemoCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn listing<T: Clone>(&self, items: &[T]) -> Result<Vec<T>, RemoteError> {
        match &self.listing_failure {
            Some(reason) => Err(RemoteError::Transport(reason.clone())),
            None => Ok(items.to_vec()),
        }
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn text_reply(text: impl Into<String>) -> ToolReply {
    ToolReply { is_error: false, content: vec![ContentItem::Text(text.into())] }
}

#[async_trait]
impl Remote for DemoRemote {
    async fn list_operations(&self) -> Result<Vec<Operation>, RemoteError> {
        self.listing(self.catalog.operations())
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, RemoteError> {
        self.listing(self.catalog.resources())
    }

    async fn list_prompts(&self) -> Result<Vec<PromptDescriptor>, RemoteError> {
        self.listing(self.catalog.prompts())
    }

    async fn invoke(
        &self,
        operation: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolReply, RemoteError> {
        self.record(DemoCall::Invoke {
            operation: operation.to_owned(),
            arguments: arguments.clone(),
        });
        self.pause().await;
        match self.handlers.get(operation) {
            Some(handler) => handler(&arguments),
            None => Ok(text_reply(Value::Object(arguments).to_string())),
        }
    }

    async fn read_resource(&self, locator: &str) -> Result<Vec<ContentItem>, RemoteError> {
        self.record(DemoCall::Read { locator: locator.to_owned() });
        self.pause().await;
        match self.resources.get(locator) {
            Some(Ok(contents)) => Ok(contents.clone()),
            Some(Err(reason)) => Err(RemoteError::Transport(reason.clone())),
            None => Err(RemoteError::Transport(format!("unknown resource: {locator}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DemoCall, DemoRemote};
    use crate::model::{CatalogSnapshot, ContentItem};
    use crate::remote::Remote;
    use serde_json::{json, Map};

    #[tokio::test]
    async fn sample_catalog_lists_every_kind() {
        let remote = DemoRemote::sample();
        let catalog = CatalogSnapshot::fetch(&remote).await.expect("catalog");
        assert!(catalog.operations().iter().any(|op| op.name() == "ping"));
        assert_eq!(catalog.resources().len(), 3);
        assert_eq!(catalog.prompts()[0].name(), "greet");
    }

    #[tokio::test]
    async fn add_sums_its_arguments_and_records_the_call() {
        let remote = DemoRemote::sample();
        let args = json!({"a": 3.0, "b": 4.0}).as_object().cloned().expect("object");
        let reply = remote.invoke("add", args.clone()).await.expect("reply");
        assert_eq!(reply.content, vec![ContentItem::Text("7".into())]);
        assert_eq!(
            remote.calls(),
            vec![DemoCall::Invoke { operation: "add".into(), arguments: args }]
        );
    }

    #[tokio::test]
    async fn unhandled_operations_echo_arguments() {
        let remote = DemoRemote::new(CatalogSnapshot::default());
        let reply = remote.invoke("anything", Map::new()).await.expect("reply");
        assert_eq!(reply.content, vec![ContentItem::Text("{}".into())]);
    }

    #[tokio::test]
    async fn broken_resources_and_listings_fail() {
        let remote = DemoRemote::sample();
        assert!(remote.read_resource("demo://missing").await.is_err());
        assert!(remote.read_resource("demo://nope").await.is_err());

        let remote = DemoRemote::sample().with_listing_failure("boom");
        assert!(CatalogSnapshot::fetch(&remote).await.is_err());
    }
}

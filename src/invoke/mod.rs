// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Asynchronous remote calls.
//!
//! [`AsyncInvoker`] runs each call on the tokio runtime and reports back through an unbounded
//! channel that the TUI loop drains between frames. Every dispatched job produces exactly one
//! [`Completion`], including jobs whose remote call panics.

use std::future::Future;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::model::{Completion, ContentItem, InvocationOutcome, JobId, ToolReply};
use crate::remote::Remote;

#[derive(Clone)]
pub struct AsyncInvoker {
    runtime: Handle,
    remote: Arc<dyn Remote>,
    completions: UnboundedSender<Completion>,
}

impl AsyncInvoker {
    /// Creates an invoker and the receiving end of its completion channel.
    pub fn new(runtime: Handle, remote: Arc<dyn Remote>) -> (Self, UnboundedReceiver<Completion>) {
        let (completions, rx) = mpsc::unbounded_channel();
        (Self { runtime, remote, completions }, rx)
    }

    /// Calls `operation` with already-coerced arguments.
    pub fn dispatch_call(&self, job: JobId, operation: String, arguments: Map<String, Value>) {
        let remote = Arc::clone(&self.remote);
        tracing::debug!(%job, %operation, "dispatching tool call");
        self.spawn_job(job, async move {
            match remote.invoke(&operation, arguments).await {
                Ok(reply) => render_tool_reply(&reply),
                Err(err) => InvocationOutcome::failure(err.to_string()),
            }
        });
    }

    /// Reads the resource at `locator`.
    pub fn dispatch_read(&self, job: JobId, locator: String) {
        let remote = Arc::clone(&self.remote);
        tracing::debug!(%job, %locator, "dispatching resource read");
        self.spawn_job(job, async move {
            match remote.read_resource(&locator).await {
                Ok(contents) => render_resource_contents(&contents),
                Err(err) => InvocationOutcome::failure(err.to_string()),
            }
        });
    }

    fn spawn_job<F>(&self, job: JobId, call: F)
    where
        F: Future<Output = InvocationOutcome> + Send + 'static,
    {
        let completions = self.completions.clone();
        let runtime = self.runtime.clone();
        self.runtime.spawn(async move {
            let outcome = match runtime.spawn(call).await {
                Ok(outcome) => outcome,
                Err(err) if err.is_panic() => {
                    tracing::error!(%job, "remote call panicked");
                    InvocationOutcome::failure("remote call panicked")
                }
                Err(err) => InvocationOutcome::failure(format!("remote call aborted: {err}")),
            };
            if completions.send(Completion { job, outcome }).is_err() {
                tracing::debug!(%job, "completion receiver dropped");
            }
        });
    }
}

/// Renders a tool reply. Replies flagged as errors are prefixed with `Error:`.
pub fn render_tool_reply(reply: &ToolReply) -> InvocationOutcome {
    let body = render_items(&reply.content);
    if reply.is_error {
        InvocationOutcome::remote_error(format!("Error:\n{body}"))
    } else {
        InvocationOutcome::success(body)
    }
}

pub fn render_resource_contents(contents: &[ContentItem]) -> InvocationOutcome {
    InvocationOutcome::success(render_items(contents))
}

fn render_items(items: &[ContentItem]) -> String {
    items.iter().map(render_item).collect::<Vec<_>>().join("\n")
}

pub fn render_item(item: &ContentItem) -> String {
    match item {
        ContentItem::Text(text) => render_text(text),
        ContentItem::Json { kind, value } => render_json(kind, value),
        ContentItem::Unsupported { kind } => unsupported(kind),
    }
}

fn render_text(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_owned())
        }
        _ => text.to_owned(),
    }
}

fn render_json(kind: &str, value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| unsupported(kind))
}

fn unsupported(kind: &str) -> String {
    format!("Unsupported content type: {kind}")
}

#[cfg(test)]
mod tests;

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;

use super::{render_item, render_tool_reply, AsyncInvoker};
use crate::model::{CatalogSnapshot, Completion, ContentItem, JobId, ToolReply};
use crate::remote::{DemoRemote, Remote};

fn invoker(remote: DemoRemote) -> (AsyncInvoker, UnboundedReceiver<Completion>) {
    AsyncInvoker::new(Handle::current(), Arc::new(remote) as Arc<dyn Remote>)
}

#[test]
fn json_text_is_pretty_printed() {
    let rendered = render_item(&ContentItem::Text(r#"{"a":1,"b":[true]}"#.into()));
    assert_eq!(rendered, "{\n  \"a\": 1,\n  \"b\": [\n    true\n  ]\n}");
}

#[test]
fn plain_text_is_left_alone() {
    assert_eq!(render_item(&ContentItem::Text("pong".into())), "pong");
    assert_eq!(render_item(&ContentItem::Text("{broken".into())), "{broken");
}

#[test]
fn unsupported_items_are_labeled() {
    let rendered = render_item(&ContentItem::Unsupported { kind: "audio".into() });
    assert_eq!(rendered, "Unsupported content type: audio");
}

#[test]
fn structured_items_are_pretty_printed() {
    let rendered = render_item(&ContentItem::Json {
        kind: "image".into(),
        value: json!({"type": "image", "mimeType": "image/png"}),
    });
    assert!(rendered.starts_with("{\n  "));
    assert!(rendered.contains("\"mimeType\": \"image/png\""));
}

#[test]
fn error_replies_are_prefixed_and_fail() {
    let outcome = render_tool_reply(&ToolReply {
        is_error: true,
        content: vec![ContentItem::Text("bad input".into())],
    });
    assert!(!outcome.is_success());
    assert_eq!(outcome.rendered_text(), "Error:\nbad input");
    assert_eq!(outcome.error_detail(), Some("Error:\nbad input"));
}

#[test]
fn multiple_items_are_joined_by_lines() {
    let outcome = render_tool_reply(&ToolReply {
        is_error: false,
        content: vec![ContentItem::Text("one".into()), ContentItem::Text("two".into())],
    });
    assert_eq!(outcome.rendered_text(), "one\ntwo");
}

#[tokio::test]
async fn call_delivers_exactly_one_completion() {
    let (invoker, mut rx) = invoker(DemoRemote::sample());
    let args = json!({"a": 3.0, "b": 4.0}).as_object().cloned().expect("object");
    invoker.dispatch_call(JobId::new(1), "add".into(), args);

    let completion = rx.recv().await.expect("completion");
    assert_eq!(completion.job, JobId::new(1));
    assert!(completion.outcome.is_success());
    assert_eq!(completion.outcome.rendered_text(), "7");

    drop(invoker);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn failing_read_reports_error_detail() {
    let (invoker, mut rx) = invoker(DemoRemote::sample());
    invoker.dispatch_read(JobId::new(9), "demo://missing".into());

    let completion = rx.recv().await.expect("completion");
    assert_eq!(completion.job, JobId::new(9));
    assert!(!completion.outcome.is_success());
    assert!(!completion.outcome.error_detail().unwrap_or_default().is_empty());
    assert!(completion.outcome.rendered_text().starts_with("Error: "));
}

#[tokio::test]
async fn panicking_call_still_completes() {
    let remote = DemoRemote::new(CatalogSnapshot::default())
        .with_tool("explode", |_| panic!("handler blew up"));
    let (invoker, mut rx) = invoker(remote);
    invoker.dispatch_call(JobId::new(2), "explode".into(), Map::new());

    let completion = rx.recv().await.expect("completion");
    assert_eq!(completion.job, JobId::new(2));
    assert!(!completion.outcome.is_success());
    assert_eq!(completion.outcome.error_detail(), Some("remote call panicked"));
}

#[tokio::test]
async fn completions_arrive_in_completion_order() {
    let slow = DemoRemote::sample().with_latency(Duration::from_millis(80));
    let (slow_invoker, mut rx) = invoker(slow);
    slow_invoker.dispatch_call(JobId::new(1), "ping".into(), Map::new());

    // same channel, no latency
    let fast = AsyncInvoker {
        remote: Arc::new(DemoRemote::sample()),
        ..slow_invoker.clone()
    };
    fast.dispatch_read(JobId::new(2), "demo://readme".into());

    assert_eq!(rx.recv().await.expect("first").job, JobId::new(2));
    assert_eq!(rx.recv().await.expect("second").job, JobId::new(1));
}

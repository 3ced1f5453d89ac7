// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde_json::Value;

/// Identifier attached to every dispatched job and echoed back by its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One content item returned by the remote server.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    /// Plain text. May itself hold JSON, which is pretty-printed when rendered.
    Text(String),
    /// A non-textual item (image, audio, embedded resource, ...) converted to structured data.
    Json { kind: String, value: Value },
    /// An item that could not be converted to structured data.
    Unsupported { kind: String },
}

/// The remote's reply to a tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReply {
    pub is_error: bool,
    pub content: Vec<ContentItem>,
}

/// The result of one asynchronous remote call, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutcome {
    success: bool,
    rendered_text: String,
    error_detail: Option<String>,
}

impl InvocationOutcome {
    pub fn success(rendered_text: impl Into<String>) -> Self {
        Self { success: true, rendered_text: rendered_text.into(), error_detail: None }
    }

    /// A failed call. The rendered text is `Error: <detail>`.
    pub fn failure(error_detail: impl Into<String>) -> Self {
        let error_detail = error_detail.into();
        Self {
            success: false,
            rendered_text: format!("Error: {error_detail}"),
            error_detail: Some(error_detail),
        }
    }

    /// A call that completed but was flagged as an error by the remote.
    pub fn remote_error(rendered_text: impl Into<String>) -> Self {
        let rendered_text = rendered_text.into();
        Self { success: false, error_detail: Some(rendered_text.clone()), rendered_text }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn rendered_text(&self) -> &str {
        &self.rendered_text
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }
}

/// Message delivered to the controller exactly once per dispatched job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub job: JobId,
    pub outcome: InvocationOutcome,
}

#[cfg(test)]
mod tests {
    use super::{InvocationOutcome, JobId};

    #[test]
    fn failure_prefixes_rendered_text() {
        let outcome = InvocationOutcome::failure("connection reset");
        assert!(!outcome.is_success());
        assert_eq!(outcome.rendered_text(), "Error: connection reset");
        assert_eq!(outcome.error_detail(), Some("connection reset"));
    }

    #[test]
    fn job_ids_increase() {
        let first = JobId::new(1);
        assert!(first.next() > first);
        assert_eq!(first.next().to_string(), "#2");
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! The catalog holds what the remote server exposes (operations, resources, prompts) and is
//! immutable once fetched. Outcomes describe the one-shot result of an asynchronous call.

pub mod catalog;
pub mod outcome;

pub use catalog::{
    BrowseKind, CatalogSnapshot, Operation, ParamType, Parameter, PromptDescriptor, Resource,
};
pub use outcome::{Completion, ContentItem, InvocationOutcome, JobId, ToolReply};

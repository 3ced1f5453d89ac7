// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Triton: a terminal inspector for MCP servers.
//!
//! Connects to one server, fetches its catalog once, and lets an operator browse tools,
//! resources and prompts, call tools with typed arguments and read resources, next to a live
//! diagnostic transcript.

pub mod config;
pub mod diagnostics;
pub mod form;
pub mod invoke;
pub mod model;
pub mod remote;
pub mod tui;

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Triton CLI entrypoint.
//!
//! Connects to one MCP server over stdio, SSE or streamable HTTP (or to the built-in demo
//! server), fetches its catalog and runs the interactive inspector until the operator quits.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser as ClapParser, Subcommand};
use thiserror::Error;
use triton::config::SessionConfig;
use triton::diagnostics::{DiagnosticLog, TranscriptError};
use triton::invoke::AsyncInvoker;
use triton::model::CatalogSnapshot;
use triton::remote::{
    parse_env_pair, parse_header, ConnectionTarget, DemoRemote, McpRemote, Remote, RemoteError,
};
use triton::tui::{self, SessionController};

#[derive(ClapParser, Debug)]
#[command(name = "triton", version, about = "Terminal inspector for MCP servers")]
struct Cli {
    /// Log key presses and state changes, and write a transcript and debug log.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory for the transcript and debug log files.
    #[arg(long, env = "TRITON_LOG_DIR", default_value = ".", global = true)]
    log_dir: PathBuf,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Spawn a server process and talk to it over stdio.
    Stdio {
        /// Command line of the server, split on whitespace.
        command: String,

        /// Extra environment variable for the server process (KEY=VALUE).
        #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,
    },
    /// Connect to a legacy HTTP+SSE endpoint.
    Sse {
        url: String,

        /// Extra request header (Name: value).
        #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
        headers: Vec<String>,
    },
    /// Connect to a streamable HTTP endpoint.
    Http {
        url: String,

        /// Extra request header (Name: value).
        #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
        headers: Vec<String>,
    },
    /// Browse the built-in demo server.
    Demo,
}

#[derive(Debug, Error)]
enum TritonError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("terminal error: {0}")]
    Tui(String),
}

impl Mode {
    /// `None` selects the demo server.
    fn connection_target(&self) -> Option<ConnectionTarget> {
        match self {
            Self::Stdio { command, env } => Some(ConnectionTarget::Stdio {
                command: command.clone(),
                env: parse_entries(env, "environment variable", parse_env_pair),
            }),
            Self::Sse { url, headers } => Some(ConnectionTarget::Sse {
                url: url.clone(),
                headers: parse_entries(headers, "header", parse_header),
            }),
            Self::Http { url, headers } => Some(ConnectionTarget::Http {
                url: url.clone(),
                headers: parse_entries(headers, "header", parse_header),
            }),
            Self::Demo => None,
        }
    }
}

fn parse_entries(
    raw: &[String],
    what: &str,
    parse: fn(&str) -> Option<(String, String)>,
) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|entry| {
            let parsed = parse(entry);
            if parsed.is_none() {
                eprintln!("triton: ignoring malformed {what} {entry:?}");
                tracing::warn!(entry = %entry, "ignoring malformed {what}");
            }
            parsed
        })
        .collect()
}

enum Server {
    Mcp(Arc<McpRemote>),
    Demo(Arc<DemoRemote>),
}

impl Server {
    fn remote(&self) -> Arc<dyn Remote> {
        match self {
            Self::Mcp(remote) => Arc::clone(remote) as Arc<dyn Remote>,
            Self::Demo(remote) => Arc::clone(remote) as Arc<dyn Remote>,
        }
    }

    async fn shutdown(self) {
        if let Self::Mcp(remote) = self {
            match Arc::try_unwrap(remote) {
                Ok(remote) => remote.close().await,
                Err(_) => tracing::debug!("remote still referenced by running jobs; dropping"),
            }
        }
    }
}

fn run(cli: Cli) -> Result<(), TritonError> {
    let config = SessionConfig::new(cli.verbose, cli.log_dir);
    let _tracing_guard = config.init_tracing();
    let transcript = config.open_transcript()?;
    let target = cli.mode.connection_target();

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    runtime.block_on(async move {
        let server = match &target {
            Some(target) => Server::Mcp(Arc::new(McpRemote::connect(target).await?)),
            None => Server::Demo(Arc::new(DemoRemote::sample())),
        };
        let remote = server.remote();

        let mut log = DiagnosticLog::new(transcript);
        let description = target
            .as_ref()
            .map(ConnectionTarget::describe)
            .unwrap_or_else(|| "demo".to_owned());
        log.record(format!("Connected: {description}"));
        if let Server::Mcp(mcp) = &server {
            if let Some(label) = mcp.server_label() {
                log.record(format!("Server: {label}"));
            }
        }

        let controller = match CatalogSnapshot::fetch(remote.as_ref()).await {
            Ok(catalog) => SessionController::new(catalog, log, config.verbose()),
            Err(err) => {
                tracing::error!(error = %err, "catalog fetch failed");
                SessionController::fatal(err.to_string(), log)
            }
        };

        let (invoker, completions) =
            AsyncInvoker::new(tokio::runtime::Handle::current(), remote);
        let tui_result = tokio::task::spawn_blocking(move || {
            tui::run(controller, invoker, completions).map_err(|err| err.to_string())
        })
        .await?;

        server.shutdown().await;
        tui_result.map_err(TritonError::Tui)
    })
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("triton: {err}");
        std::process::exit(1);
    }
}

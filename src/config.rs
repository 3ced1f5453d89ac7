// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Session configuration and verbose-mode log files.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::diagnostics::{Transcript, TranscriptError};

pub const TRANSCRIPT_FILE: &str = "triton-transcript.log";
pub const DEBUG_LOG_FILE: &str = "triton-debug.log";
pub const DEFAULT_LOG_FILTER: &str = "triton=debug,rmcp=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    verbose: bool,
    log_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { verbose: false, log_dir: PathBuf::from(".") }
    }
}

impl SessionConfig {
    pub fn new(verbose: bool, log_dir: impl Into<PathBuf>) -> Self {
        Self { verbose, log_dir: log_dir.into() }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.log_dir.join(TRANSCRIPT_FILE)
    }

    pub fn debug_log_path(&self) -> PathBuf {
        self.log_dir.join(DEBUG_LOG_FILE)
    }

    /// Opens the transcript file in verbose mode.
    pub fn open_transcript(&self) -> Result<Option<Transcript>, TranscriptError> {
        if !self.verbose {
            return Ok(None);
        }
        Transcript::open(self.transcript_path()).map(Some)
    }

    /// Installs the file-backed tracing subscriber in verbose mode.
    ///
    /// Nothing is installed otherwise, so no tracing output can reach the terminal. The returned
    /// guard flushes the writer on drop and must live until the program exits.
    pub fn init_tracing(&self) -> Option<WorkerGuard> {
        if !self.verbose {
            return None;
        }

        let file_appender = tracing_appender::rolling::never(&self.log_dir, DEBUG_LOG_FILE);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let installed = tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
            .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
            .try_init();
        if installed.is_err() {
            return None;
        }

        tracing::info!(path = %self.debug_log_path().display(), "verbose logging enabled");
        Some(guard)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionConfig;

    #[test]
    fn quiet_sessions_open_no_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = SessionConfig::new(false, dir.path());
        assert!(config.open_transcript().expect("transcript").is_none());
        assert!(config.init_tracing().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn verbose_sessions_write_the_transcript_into_the_log_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = SessionConfig::new(true, dir.path());
        let transcript = config.open_transcript().expect("transcript").expect("verbose");
        assert_eq!(transcript.path(), dir.path().join("triton-transcript.log"));
        assert!(transcript.path().exists());
    }

    #[test]
    fn default_log_dir_is_the_working_directory() {
        let config = SessionConfig::default();
        assert_eq!(config.debug_log_path(), std::path::Path::new("./triton-debug.log"));
    }
}

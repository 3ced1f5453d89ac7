// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagnostic transcript shown in the right-hand pane.
//!
//! Entries are append-only. A recorded entry scrolls the pane to the newest line unless the
//! operator pinned the scroll position by scrolling up while the pane had focus.

use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("failed to open transcript {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
}

/// Append-only transcript file mirroring every diagnostic entry.
#[derive(Debug)]
pub struct Transcript {
    path: PathBuf,
    writer: LineWriter<File>,
}

impl Transcript {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TranscriptError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| TranscriptError::Open { path: path.clone(), source })?;
        Ok(Self { path, writer: LineWriter::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, entry: &str) -> io::Result<()> {
        writeln!(self.writer, "{entry}")?;
        self.writer.flush()
    }
}

#[derive(Debug)]
pub struct DiagnosticLog {
    entries: Vec<String>,
    line_count: usize,
    scroll: usize,
    viewport_height: usize,
    pinned: bool,
    transcript: Option<Transcript>,
}

impl DiagnosticLog {
    pub fn new(transcript: Option<Transcript>) -> Self {
        Self {
            entries: Vec::new(),
            line_count: 0,
            scroll: 0,
            viewport_height: 1,
            pinned: false,
            transcript,
        }
    }

    /// Appends an entry (a single line or a multi-line block).
    pub fn record(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        if let Some(transcript) = self.transcript.as_mut() {
            if let Err(err) = transcript.append(&entry) {
                tracing::warn!(
                    path = %transcript.path().display(),
                    %err,
                    "transcript write failed"
                );
                self.transcript = None;
            }
        }

        self.line_count += entry.split('\n').count();
        self.entries.push(entry);
        if !self.pinned {
            self.scroll_to_bottom();
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// All entries flattened to display lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().flat_map(|entry| entry.split('\n'))
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Index of the first visible line.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn has_transcript(&self) -> bool {
        self.transcript.is_some()
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        if self.pinned {
            self.scroll = self.scroll.min(self.max_scroll());
        } else {
            self.scroll_to_bottom();
        }
    }

    fn max_scroll(&self) -> usize {
        self.line_count.saturating_sub(self.viewport_height)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.pinned = self.scroll < self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = (self.scroll + lines).min(self.max_scroll());
        self.pinned = self.scroll < self.max_scroll();
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport_height);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport_height);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
        self.pinned = self.max_scroll() > 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
        self.pinned = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagnosticLog, Transcript};

    #[test]
    fn records_lines_in_order_and_appends() {
        let mut log = DiagnosticLog::new(None);
        log.record("started");
        log.record("key pressed");
        log.record("called add");
        assert_eq!(log.entries(), ["started", "key pressed", "called add"]);

        log.record("fourth");
        assert_eq!(log.entries(), ["started", "key pressed", "called add", "fourth"]);
    }

    #[test]
    fn blocks_count_every_line() {
        let mut log = DiagnosticLog::new(None);
        log.record("Result:\n========\n{}");
        assert_eq!(log.line_count(), 3);
        assert_eq!(log.lines().collect::<Vec<_>>(), vec!["Result:", "========", "{}"]);
    }

    #[test]
    fn record_scrolls_to_newest_line() {
        let mut log = DiagnosticLog::new(None);
        log.set_viewport_height(2);
        for idx in 0..5 {
            log.record(format!("line {idx}"));
        }
        assert_eq!(log.scroll(), 3);
    }

    #[test]
    fn pinned_position_survives_new_entries_until_scrolled_to_bottom() {
        let mut log = DiagnosticLog::new(None);
        log.set_viewport_height(2);
        for idx in 0..5 {
            log.record(format!("line {idx}"));
        }

        log.scroll_up(2);
        assert!(log.is_pinned());
        log.record("line 5");
        assert_eq!(log.scroll(), 1);

        log.scroll_to_bottom();
        assert!(!log.is_pinned());
        assert_eq!(log.scroll(), 4);
    }

    #[test]
    fn scrolling_back_to_bottom_unpins() {
        let mut log = DiagnosticLog::new(None);
        log.set_viewport_height(2);
        for idx in 0..4 {
            log.record(format!("line {idx}"));
        }
        log.page_up();
        assert!(log.is_pinned());
        log.page_down();
        assert!(!log.is_pinned());
        assert_eq!(log.scroll(), 2);
    }

    #[test]
    fn transcript_mirrors_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("transcript.log");
        let mut log = DiagnosticLog::new(Some(Transcript::open(&path).expect("open")));
        log.record("one");
        log.record("two\nthree");
        assert!(log.has_transcript());

        let written = std::fs::read_to_string(&path).expect("read transcript");
        assert_eq!(written, "one\ntwo\nthree\n");
    }
}

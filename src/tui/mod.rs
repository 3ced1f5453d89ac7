// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! [`SessionController`] is the state machine behind the inspector. It consumes classified
//! [`Trigger`]s and job [`Completion`]s, and hands remote work back to the caller as an
//! [`Effect`]. [`run`] drives it with crossterm input and an [`AsyncInvoker`]; [`draw`] renders it.

use std::{error::Error, fmt, io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use serde_json::{Map, Value};
use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};

use crate::diagnostics::DiagnosticLog;
use crate::form::{Advance, ArgumentForm};
use crate::invoke::AsyncInvoker;
use crate::model::{BrowseKind, CatalogSnapshot, Completion, InvocationOutcome, JobId};

mod input;

pub use input::{classify, InputContext, Trigger};

const FOCUS_COLOR: Color = Color::LightGreen;
const ERROR_COLOR: Color = Color::LightRed;
const DESCRIPTION_COLOR: Color = Color::DarkGray;
const FOOTER_LABEL_COLOR: Color = Color::Gray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const FOOTER_HEIGHT: u16 = 1;
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The active main-pane view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Browsing(BrowseKind),
    ArgumentEntry,
    ResultDisplay,
    ResourceDetail,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browsing(kind) => write!(f, "browsing {}", kind.label().to_lowercase()),
            Self::ArgumentEntry => f.write_str("argument entry"),
            Self::ResultDisplay => f.write_str("result"),
            Self::ResourceDetail => f.write_str("resource detail"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Main,
    Debug,
}

impl Focus {
    fn toggle(self) -> Self {
        match self {
            Self::Main => Self::Debug,
            Self::Debug => Self::Main,
        }
    }
}

/// Remote work requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Call { job: JobId, operation: String, arguments: Map<String, Value> },
    Read { job: JobId, locator: String },
    Copy(String),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum JobTarget {
    Call { operation: String },
    Read { locator: String },
}

/// The job whose completion the controller is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingJob {
    job: JobId,
    target: JobTarget,
    origin: View,
}

impl PendingJob {
    pub fn job(&self) -> JobId {
        self.job
    }

    pub fn origin(&self) -> View {
        self.origin
    }

    pub fn label(&self) -> &str {
        match &self.target {
            JobTarget::Call { operation } => operation,
            JobTarget::Read { locator } => locator,
        }
    }
}

/// A completed call shown in the result views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPane {
    title: String,
    outcome: InvocationOutcome,
    scroll: usize,
}

impl ResultPane {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn outcome(&self) -> &InvocationOutcome {
        &self.outcome
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    fn line_count(&self) -> usize {
        self.outcome.rendered_text().split('\n').count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ListFilter {
    query: String,
    editing: bool,
}

impl ListFilter {
    fn is_active(&self) -> bool {
        self.editing || !self.query.is_empty()
    }
}

pub struct SessionController {
    catalog: CatalogSnapshot,
    view: View,
    focus: Focus,
    cursors: [usize; 3],
    filter: ListFilter,
    form: Option<ArgumentForm>,
    detail_locator: Option<String>,
    result: Option<ResultPane>,
    pending: Option<PendingJob>,
    last_job: JobId,
    fatal: Option<String>,
    log: DiagnosticLog,
    verbose: bool,
    width: u16,
    height: u16,
    toast: Option<String>,
}

impl SessionController {
    pub fn new(catalog: CatalogSnapshot, log: DiagnosticLog, verbose: bool) -> Self {
        let mut controller = Self::blank(catalog, log, verbose);
        controller.log.record(format!(
            "Catalog: {} tools, {} resources, {} prompts",
            controller.catalog.operations().len(),
            controller.catalog.resources().len(),
            controller.catalog.prompts().len(),
        ));
        controller
    }

    /// A controller that only shows `error` and waits for quit.
    pub fn fatal(error: impl Into<String>, log: DiagnosticLog) -> Self {
        let error = error.into();
        let mut controller = Self::blank(CatalogSnapshot::default(), log, false);
        tracing::error!(%error, "catalog unavailable");
        controller.log.record(format!("Error: {error}"));
        controller.fatal = Some(error);
        controller
    }

    fn blank(catalog: CatalogSnapshot, log: DiagnosticLog, verbose: bool) -> Self {
        let mut controller = Self {
            catalog,
            view: View::Browsing(BrowseKind::Tool),
            focus: Focus::Main,
            cursors: [0; 3],
            filter: ListFilter::default(),
            form: None,
            detail_locator: None,
            result: None,
            pending: None,
            last_job: JobId::new(0),
            fatal: None,
            log,
            verbose,
            width: 80,
            height: 24,
            toast: None,
        };
        controller.log.set_viewport_height(debug_viewport_height(controller.height));
        controller
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn form(&self) -> Option<&ArgumentForm> {
        self.form.as_ref()
    }

    pub fn result(&self) -> Option<&ResultPane> {
        self.result.as_ref()
    }

    /// Locator of the resource shown in the detail view.
    pub fn detail_locator(&self) -> Option<&str> {
        self.detail_locator.as_deref()
    }

    pub fn pending(&self) -> Option<&PendingJob> {
        self.pending.as_ref()
    }

    pub fn fatal_error(&self) -> Option<&str> {
        self.fatal.as_deref()
    }

    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    pub fn filter_query(&self) -> Option<&str> {
        self.filter.is_active().then_some(self.filter.query.as_str())
    }

    pub fn is_filtering(&self) -> bool {
        self.filter.editing
    }

    pub fn toast(&self) -> Option<&str> {
        self.toast.as_deref()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn input_context(&self) -> InputContext {
        InputContext { view: self.view, focus: self.focus, filtering: self.filter.editing }
    }

    /// Index into the visible entries of `kind`.
    pub fn cursor(&self, kind: BrowseKind) -> usize {
        self.cursors[kind_slot(kind)]
    }

    /// Catalog indices of the entries currently listed for `kind`, best match first while a
    /// filter is active.
    pub fn visible_entries(&self, kind: BrowseKind) -> Vec<usize> {
        let total = self.catalog.len_of(kind);
        let query = self.filter.query.trim();
        if query.is_empty() || self.view != View::Browsing(kind) {
            return (0..total).collect();
        }
        ranked_matches(query, &self.catalog.entries(kind))
    }

    fn selected_entry(&self, kind: BrowseKind) -> Option<usize> {
        self.visible_entries(kind).get(self.cursor(kind)).copied()
    }

    /// Classifies and handles one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if self.verbose {
            self.log.record(format!("Key pressed: {}", key_label(key)));
        }
        let trigger = classify(key, self.input_context());
        self.handle_trigger(trigger)
    }

    pub fn handle_trigger(&mut self, trigger: Trigger) -> Option<Effect> {
        if self.fatal.is_some() {
            return (trigger == Trigger::Quit).then_some(Effect::Quit);
        }
        self.toast = None;

        match trigger {
            Trigger::Quit => return Some(Effect::Quit),
            Trigger::Ignored => return None,
            Trigger::ToggleFocus => {
                self.focus = self.focus.toggle();
                if self.verbose {
                    self.log.record(format!("Focus: {:?}", self.focus));
                }
                return None;
            }
            Trigger::Cancel => {
                self.cancel();
                return None;
            }
            Trigger::Resize { width, height } => {
                self.width = width;
                self.height = height;
                self.log.set_viewport_height(debug_viewport_height(height));
                return None;
            }
            _ => {}
        }

        if self.focus == Focus::Debug {
            self.scroll_log(trigger);
            return None;
        }

        match self.view {
            View::Browsing(kind) => self.handle_browsing(kind, trigger),
            View::ArgumentEntry => self.handle_argument_entry(trigger),
            View::ResultDisplay | View::ResourceDetail => self.handle_result(trigger),
        }
    }

    /// Applies a job completion. Completions for anything but the pending job are dropped.
    pub fn apply_completion(&mut self, completion: Completion) {
        let Completion { job, outcome } = completion;
        let pending = match self.pending.take() {
            Some(pending) if pending.job == job => pending,
            other => {
                self.pending = other;
                tracing::debug!(%job, "stale result dropped");
                self.log.record(format!("Stale result {job} dropped"));
                return;
            }
        };

        if !outcome.is_success() {
            tracing::warn!(
                %job,
                detail = outcome.error_detail().unwrap_or_default(),
                "remote call failed"
            );
        }

        match pending.target {
            JobTarget::Call { operation } => {
                if self.verbose {
                    self.log.record("Tool result received");
                }
                self.log.record(format!("Result:\n========\n{}", outcome.rendered_text()));
                self.transition(View::ResultDisplay);
                self.result = Some(ResultPane { title: operation, outcome, scroll: 0 });
            }
            JobTarget::Read { locator } => {
                if self.verbose {
                    self.log.record("Resource result received");
                }
                if !outcome.is_success() {
                    self.log.record(outcome.rendered_text().to_owned());
                }
                self.result = Some(ResultPane { title: locator, outcome, scroll: 0 });
            }
        }
    }

    /// Reports the outcome of an [`Effect::Copy`].
    pub fn note_copied(&mut self, result: Result<&str, String>) {
        let message = match result {
            Ok(backend) => format!("Copied result ({backend})"),
            Err(err) => format!("Clipboard error: {err}"),
        };
        self.log.record(message.clone());
        self.toast = Some(message);
    }

    fn cancel(&mut self) {
        if matches!(self.view, View::Browsing(_)) && self.filter.is_active() {
            self.clear_filter();
            return;
        }

        if let Some(pending) = self.pending.take() {
            self.log.record(format!("Abandoned job {} ({})", pending.job, pending.label()));
        }
        let target = match self.view {
            View::ResourceDetail => View::Browsing(BrowseKind::Resource),
            _ => View::Browsing(BrowseKind::Tool),
        };
        self.transition(target);
    }

    /// Switches views. Leaving a view discards its transient state and the pending job.
    fn transition(&mut self, view: View) {
        if view == self.view {
            return;
        }
        if self.verbose {
            self.log.record(format!("State change: {} -> {}", self.view, view));
        }
        tracing::debug!(from = %self.view, to = %view, "view change");

        self.pending = None;
        self.form = None;
        self.result = None;
        self.detail_locator = None;
        if matches!(self.view, View::Browsing(_)) {
            self.clear_filter();
        }
        self.view = view;
    }

    fn handle_browsing(&mut self, kind: BrowseKind, trigger: Trigger) -> Option<Effect> {
        if self.filter.editing {
            match trigger {
                Trigger::Text(ch) => {
                    self.filter.query.push(ch);
                    self.cursors[kind_slot(kind)] = 0;
                }
                Trigger::Backspace => {
                    self.filter.query.pop();
                    self.cursors[kind_slot(kind)] = 0;
                }
                Trigger::Select => self.filter.editing = false,
                Trigger::Up => self.move_cursor(kind, -1),
                Trigger::Down => self.move_cursor(kind, 1),
                _ => {}
            }
            return None;
        }

        match trigger {
            Trigger::Select => return self.select_entry(kind),
            Trigger::SwitchKind(next) => self.transition(View::Browsing(next)),
            Trigger::StartFilter => {
                self.filter = ListFilter { query: String::new(), editing: true };
            }
            Trigger::Up => self.move_cursor(kind, -1),
            Trigger::Down => self.move_cursor(kind, 1),
            Trigger::PageUp => self.move_cursor(kind, -(self.list_page() as isize)),
            Trigger::PageDown => self.move_cursor(kind, self.list_page() as isize),
            Trigger::Home => self.cursors[kind_slot(kind)] = 0,
            Trigger::End => {
                self.cursors[kind_slot(kind)] = self.visible_entries(kind).len().saturating_sub(1);
            }
            _ => {}
        }
        None
    }

    fn select_entry(&mut self, kind: BrowseKind) -> Option<Effect> {
        let index = self.selected_entry(kind)?;
        match kind {
            BrowseKind::Tool => {
                let operation = self.catalog.operations()[index].clone();
                match ArgumentForm::build(&operation) {
                    Some(form) => {
                        self.transition(View::ArgumentEntry);
                        self.form = Some(form);
                        None
                    }
                    None => {
                        if self.holds_pending_call() {
                            return None;
                        }
                        if self.verbose {
                            self.log.record("No arguments needed, calling tool directly");
                        }
                        Some(self.dispatch_call(operation.name().to_owned(), Map::new()))
                    }
                }
            }
            BrowseKind::Resource => {
                let locator = self.catalog.resources()[index].locator().to_owned();
                self.transition(View::ResourceDetail);
                self.detail_locator = Some(locator.clone());
                self.log.record(format!("Reading resource '{locator}'"));
                let job = self.next_job();
                self.pending = Some(PendingJob {
                    job,
                    target: JobTarget::Read { locator: locator.clone() },
                    origin: self.view,
                });
                Some(Effect::Read { job, locator })
            }
            BrowseKind::Prompt => {
                let prompt = &self.catalog.prompts()[index];
                let arguments = if prompt.arguments().is_empty() {
                    "none".to_owned()
                } else {
                    prompt.arguments().join(", ")
                };
                self.log.record(format!("Prompt '{}' arguments: {arguments}", prompt.name()));
                None
            }
        }
    }

    fn handle_argument_entry(&mut self, trigger: Trigger) -> Option<Effect> {
        if trigger == Trigger::Select && self.holds_pending_call() {
            return None;
        }
        let form = self.form.as_mut()?;
        match trigger {
            Trigger::Select => {
                if form.advance() == Advance::Submit {
                    if self.verbose {
                        self.log.record("Last argument input, calling tool");
                    }
                    return self.submit_form();
                }
            }
            Trigger::CycleField => form.cycle(),
            Trigger::Text(ch) => form.focused_field_mut().insert_char(ch),
            Trigger::Backspace => form.focused_field_mut().backspace(),
            Trigger::Delete => form.focused_field_mut().delete(),
            Trigger::Left => form.focused_field_mut().move_left(),
            Trigger::Right => form.focused_field_mut().move_right(),
            Trigger::Home => form.focused_field_mut().move_home(),
            Trigger::End => form.focused_field_mut().move_end(),
            _ => {}
        }
        None
    }

    /// Logs and reports a call still awaited in this view. One job is outstanding at a time.
    fn holds_pending_call(&mut self) -> bool {
        let Some(pending) = &self.pending else {
            return false;
        };
        let line = format!("Call already pending: {} ({})", pending.job, pending.label());
        self.log.record(line);
        true
    }

    fn submit_form(&mut self) -> Option<Effect> {
        let form = self.form.as_ref()?;
        let operation = form.operation_name().to_owned();
        let coerced = form.coerce();
        for warning in &coerced.warnings {
            tracing::warn!(
                field = %warning.field,
                expected = %warning.expected,
                input = %warning.input,
                "argument coercion failed"
            );
            self.log.record(warning.to_string());
        }
        Some(self.dispatch_call(operation, coerced.arguments))
    }

    fn dispatch_call(&mut self, operation: String, arguments: Map<String, Value>) -> Effect {
        let pretty = serde_json::to_string_pretty(&arguments).unwrap_or_else(|err| {
            self.log.record(format!("Error marshalling args: {err}"));
            String::new()
        });
        self.log.record(format!("========\nCalling tool '{operation}' with args:\n{pretty}"));

        let job = self.next_job();
        self.pending = Some(PendingJob {
            job,
            target: JobTarget::Call { operation: operation.clone() },
            origin: self.view,
        });
        Effect::Call { job, operation, arguments }
    }

    fn handle_result(&mut self, trigger: Trigger) -> Option<Effect> {
        let page = self.result_page();
        let result = self.result.as_mut()?;
        let max_scroll = result.line_count().saturating_sub(page);
        match trigger {
            Trigger::Up => result.scroll = result.scroll.saturating_sub(1),
            Trigger::Down => result.scroll = (result.scroll + 1).min(max_scroll),
            Trigger::PageUp => result.scroll = result.scroll.saturating_sub(page),
            Trigger::PageDown => result.scroll = (result.scroll + page).min(max_scroll),
            Trigger::Home => result.scroll = 0,
            Trigger::End => result.scroll = max_scroll,
            Trigger::Copy => return Some(Effect::Copy(result.outcome.rendered_text().to_owned())),
            _ => {}
        }
        None
    }

    fn scroll_log(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::Up => self.log.scroll_up(1),
            Trigger::Down => self.log.scroll_down(1),
            Trigger::PageUp => self.log.page_up(),
            Trigger::PageDown => self.log.page_down(),
            Trigger::Home => self.log.scroll_to_top(),
            Trigger::End => self.log.scroll_to_bottom(),
            _ => {}
        }
    }

    fn move_cursor(&mut self, kind: BrowseKind, delta: isize) {
        let len = self.visible_entries(kind).len();
        let slot = &mut self.cursors[kind_slot(kind)];
        if len == 0 {
            *slot = 0;
            return;
        }
        *slot = slot.saturating_add_signed(delta).min(len - 1);
    }

    fn clear_filter(&mut self) {
        let View::Browsing(kind) = self.view else {
            self.filter = ListFilter::default();
            return;
        };
        let selected = self.selected_entry(kind);
        self.filter = ListFilter::default();
        self.cursors[kind_slot(kind)] = selected.unwrap_or(0);
    }

    fn next_job(&mut self) -> JobId {
        self.last_job = self.last_job.next();
        self.last_job
    }

    fn list_page(&self) -> usize {
        usize::from(main_viewport_height(self.height)).max(1)
    }

    fn result_page(&self) -> usize {
        usize::from(main_viewport_height(self.height)).max(1)
    }
}

fn kind_slot(kind: BrowseKind) -> usize {
    match kind {
        BrowseKind::Tool => 0,
        BrowseKind::Resource => 1,
        BrowseKind::Prompt => 2,
    }
}

/// Content rows inside a bordered pane above the footer.
fn main_viewport_height(height: u16) -> u16 {
    height.saturating_sub(FOOTER_HEIGHT + 2)
}

fn debug_viewport_height(height: u16) -> usize {
    usize::from(main_viewport_height(height))
}

fn key_label(key: KeyEvent) -> String {
    let code = match key.code {
        KeyCode::Char(' ') => "space".to_owned(),
        KeyCode::Char(ch) => ch.to_string(),
        code => format!("{code:?}").to_lowercase(),
    };
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        format!("ctrl+{code}")
    } else if key.modifiers.contains(KeyModifiers::ALT) {
        format!("alt+{code}")
    } else {
        code
    }
}

/// Runs the interactive session until the operator quits.
///
/// Blocks the calling thread; jobs run on the invoker's runtime.
pub fn run(
    mut controller: SessionController,
    invoker: AsyncInvoker,
    mut completions: UnboundedReceiver<Completion>,
) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let size = terminal.size()?;
    controller.handle_trigger(Trigger::Resize { width: size.width, height: size.height });

    loop {
        loop {
            match completions.try_recv() {
                Ok(completion) => controller.apply_completion(completion),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        terminal.draw(|frame| draw(frame, &controller))?;

        if !event::poll(INPUT_POLL_INTERVAL)? {
            continue;
        }
        let effect = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => controller.handle_key(key),
            Event::Resize(width, height) => {
                controller.handle_trigger(Trigger::Resize { width, height })
            }
            _ => None,
        };

        match effect {
            Some(Effect::Call { job, operation, arguments }) => {
                invoker.dispatch_call(job, operation, arguments)
            }
            Some(Effect::Read { job, locator }) => invoker.dispatch_read(job, locator),
            Some(Effect::Copy(text)) => controller.note_copied(terminal.copy(&text)),
            Some(Effect::Quit) => break,
            None => {}
        }
    }

    Ok(())
}

pub fn draw(frame: &mut Frame<'_>, controller: &SessionController) {
    let area = frame.size();

    if let Some(error) = controller.fatal_error() {
        let text = format!("Error: {error}\n\nPress ctrl+c to quit.");
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(ERROR_COLOR))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
        .split(area);
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)])
        .split(rows[0]);

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border_style_for_focus(controller.focus(), Focus::Main))
        .title(main_pane_title(controller));
    let main_inner = main_block.inner(panes[0]);
    frame.render_widget(main_block, panes[0]);

    match controller.view() {
        View::Browsing(kind) => render_browsing(frame, controller, kind, main_inner),
        View::ArgumentEntry => render_argument_entry(frame, controller, main_inner),
        View::ResultDisplay | View::ResourceDetail => {
            render_result(frame, controller, main_inner)
        }
    }

    render_debug_pane(frame, controller, panes[1]);
    frame.render_widget(Paragraph::new(footer_help_line(controller)), rows[1]);
}

include!("chrome.rs");

/// Raw-mode alternate screen that is restored on drop.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let enter = || -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
            terminal.clear()?;
            Ok(terminal)
        };
        match enter() {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                restore_terminal();
                Err(err)
            }
        }
    }

    fn size(&self) -> io::Result<Rect> {
        self.terminal.size()
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn).map(|_| ())
    }

    /// Hands `text` to the host clipboard with an OSC 52 escape.
    fn copy(&mut self, text: &str) -> Result<&'static str, String> {
        let backend = self.terminal.backend_mut();
        execute!(backend, Print(osc52_sequence(text))).map_err(|err| err.to_string())?;
        Ok("osc52")
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn osc52_sequence(text: &str) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    format!("\x1b]52;c;{}\x1b\\", STANDARD.encode(text))
}

/// Where an in-order match of the query sits inside a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubsequenceStats {
    first: usize,
    span: usize,
    adjacent: usize,
    word_starts: usize,
}

/// Catalog indices of `entries` matching `query`, best first. Ties keep catalog order.
fn ranked_matches(query: &str, entries: &[(&str, &str)]) -> Vec<usize> {
    let needle = query.to_lowercase();
    let mut scored = entries
        .iter()
        .enumerate()
        .filter_map(|(idx, (name, description))| {
            let name_score = fuzzy_score(&needle, &name.to_lowercase()).map(|score| score + 1000);
            let description_score = fuzzy_score(&needle, &description.to_lowercase());
            name_score.max(description_score).map(|score| (idx, score))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|(a_idx, a_score), (b_idx, b_score)| {
        b_score.cmp(a_score).then(a_idx.cmp(b_idx))
    });
    scored.into_iter().map(|(idx, _)| idx).collect()
}

fn fuzzy_score(needle: &str, haystack: &str) -> Option<i64> {
    let needle = needle.trim();
    if needle.is_empty() {
        return None;
    }

    let stats = subsequence_stats(needle, haystack)?;
    let ratio = rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars());

    let mut score = (ratio * 1000.0).round() as i64;
    score -= stats.span as i64 + stats.first as i64 / 4;
    score += stats.adjacent as i64 * 40 + stats.word_starts as i64 * 75;
    score += if haystack.contains(needle) { 2000 } else { 500 };
    Some(score)
}

/// Greedy left-to-right match of `needle` in `haystack`; `None` unless every char is found.
fn subsequence_stats(needle: &str, haystack: &str) -> Option<SubsequenceStats> {
    let mut wanted = needle.chars().peekable();
    let mut positions = Vec::new();
    let mut word_starts = 0;
    let mut previous = None::<char>;

    for (idx, ch) in haystack.chars().enumerate() {
        if wanted.peek() == Some(&ch) {
            wanted.next();
            if previous.map_or(true, is_boundary_char) {
                word_starts += 1;
            }
            positions.push(idx);
        }
        previous = Some(ch);
    }
    if wanted.peek().is_some() {
        return None;
    }

    let (&first, &last) = (positions.first()?, positions.last()?);
    Some(SubsequenceStats {
        first,
        span: last - first + 1,
        adjacent: positions.windows(2).filter(|pair| pair[1] == pair[0] + 1).count(),
        word_starts,
    })
}

fn is_boundary_char(ch: char) -> bool {
    matches!(ch, '/' | ':' | '-' | '_' | ' ' | '.')
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{draw, Effect, SessionController, Trigger};
    use crate::diagnostics::DiagnosticLog;
    use crate::model::{CatalogSnapshot, Completion};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    /// Drives a controller without a terminal.
    pub(crate) struct HeadlessTui {
        controller: SessionController,
    }

    impl HeadlessTui {
        pub(crate) fn new(catalog: CatalogSnapshot) -> Self {
            Self::with_controller(SessionController::new(catalog, DiagnosticLog::new(None), false))
        }

        pub(crate) fn with_controller(controller: SessionController) -> Self {
            Self { controller }
        }

        pub(crate) fn press(&mut self, code: KeyCode) -> Option<Effect> {
            self.controller.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
        }

        pub(crate) fn press_ctrl(&mut self, ch: char) -> Option<Effect> {
            self.controller.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
        }

        pub(crate) fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }

        pub(crate) fn trigger(&mut self, trigger: Trigger) -> Option<Effect> {
            self.controller.handle_trigger(trigger)
        }

        pub(crate) fn complete(&mut self, completion: Completion) {
            self.controller.apply_completion(completion);
        }

        pub(crate) fn controller(&self) -> &SessionController {
            &self.controller
        }

        /// Renders one frame and returns the screen as text rows.
        pub(crate) fn render(&self, width: u16, height: u16) -> Vec<String> {
            let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
            terminal.draw(|frame| draw(frame, &self.controller)).expect("draw");
            let buffer = terminal.backend().buffer();
            (0..height)
                .map(|y| (0..width).map(|x| buffer.get(x, y).symbol()).collect::<String>())
                .collect()
        }
    }
}

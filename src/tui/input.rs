// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Key event classification.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{Focus, View};
use crate::model::BrowseKind;

/// A classified input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Quit,
    Cancel,
    ToggleFocus,
    CycleField,
    Select,
    SwitchKind(BrowseKind),
    StartFilter,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Left,
    Right,
    Backspace,
    Delete,
    Text(char),
    Copy,
    Resize { width: u16, height: u16 },
    Ignored,
}

/// What the classifier needs to know about the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputContext {
    pub view: View,
    pub focus: Focus,
    pub filtering: bool,
}

pub fn classify(key: KeyEvent, ctx: InputContext) -> Trigger {
    if key.kind == KeyEventKind::Release {
        return Trigger::Ignored;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return Trigger::Quit,
        KeyCode::Esc => return Trigger::Cancel,
        KeyCode::BackTab => return Trigger::ToggleFocus,
        KeyCode::Tab => {
            return if ctx.view == View::ArgumentEntry && ctx.focus == Focus::Main {
                Trigger::CycleField
            } else {
                Trigger::ToggleFocus
            };
        }
        _ => {}
    }
    if ctrl {
        return Trigger::Ignored;
    }

    if ctx.focus == Focus::Debug {
        return classify_scroll(key.code);
    }

    match ctx.view {
        View::Browsing(_) if ctx.filtering => match key.code {
            KeyCode::Enter => Trigger::Select,
            KeyCode::Backspace => Trigger::Backspace,
            KeyCode::Up => Trigger::Up,
            KeyCode::Down => Trigger::Down,
            KeyCode::Char(ch) => Trigger::Text(ch),
            _ => Trigger::Ignored,
        },
        View::Browsing(_) => match key.code {
            KeyCode::Enter => Trigger::Select,
            KeyCode::Char('q') => Trigger::Quit,
            KeyCode::Char('t') => Trigger::SwitchKind(BrowseKind::Tool),
            KeyCode::Char('r') => Trigger::SwitchKind(BrowseKind::Resource),
            KeyCode::Char('p') => Trigger::SwitchKind(BrowseKind::Prompt),
            KeyCode::Char('/') => Trigger::StartFilter,
            code => classify_scroll(code),
        },
        View::ArgumentEntry => match key.code {
            KeyCode::Enter => Trigger::Select,
            KeyCode::Left => Trigger::Left,
            KeyCode::Right => Trigger::Right,
            KeyCode::Home => Trigger::Home,
            KeyCode::End => Trigger::End,
            KeyCode::Backspace => Trigger::Backspace,
            KeyCode::Delete => Trigger::Delete,
            KeyCode::Char(ch) => Trigger::Text(ch),
            _ => Trigger::Ignored,
        },
        View::ResultDisplay | View::ResourceDetail => match key.code {
            KeyCode::Char('y') => Trigger::Copy,
            code => classify_scroll(code),
        },
    }
}

fn classify_scroll(code: KeyCode) -> Trigger {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Trigger::Up,
        KeyCode::Down | KeyCode::Char('j') => Trigger::Down,
        KeyCode::PageUp => Trigger::PageUp,
        KeyCode::PageDown => Trigger::PageDown,
        KeyCode::Home | KeyCode::Char('g') => Trigger::Home,
        KeyCode::End | KeyCode::Char('G') => Trigger::End,
        _ => Trigger::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, InputContext, Trigger};
    use crate::model::BrowseKind;
    use crate::tui::{Focus, View};
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use rstest::rstest;

    fn ctx(view: View, focus: Focus) -> InputContext {
        InputContext { view, focus, filtering: false }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[rstest]
    #[case(View::Browsing(BrowseKind::Tool), Focus::Main)]
    #[case(View::ArgumentEntry, Focus::Main)]
    #[case(View::ResultDisplay, Focus::Debug)]
    #[case(View::ResourceDetail, Focus::Debug)]
    fn ctrl_c_quits_everywhere(#[case] view: View, #[case] focus: Focus) {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(classify(ctrl_c, ctx(view, focus)), Trigger::Quit);
    }

    #[test]
    fn tab_cycles_fields_only_in_argument_entry_with_main_focus() {
        let tab = key(KeyCode::Tab);
        assert_eq!(classify(tab, ctx(View::ArgumentEntry, Focus::Main)), Trigger::CycleField);
        assert_eq!(classify(tab, ctx(View::ArgumentEntry, Focus::Debug)), Trigger::ToggleFocus);
        assert_eq!(
            classify(tab, ctx(View::Browsing(BrowseKind::Tool), Focus::Main)),
            Trigger::ToggleFocus
        );
        assert_eq!(
            classify(key(KeyCode::BackTab), ctx(View::ArgumentEntry, Focus::Main)),
            Trigger::ToggleFocus
        );
    }

    #[test]
    fn letters_are_text_in_entry_but_switch_kinds_in_browsing() {
        let r = key(KeyCode::Char('r'));
        assert_eq!(classify(r, ctx(View::ArgumentEntry, Focus::Main)), Trigger::Text('r'));
        assert_eq!(
            classify(r, ctx(View::Browsing(BrowseKind::Tool), Focus::Main)),
            Trigger::SwitchKind(BrowseKind::Resource)
        );
        assert_eq!(
            classify(key(KeyCode::Char('q')), ctx(View::ArgumentEntry, Focus::Main)),
            Trigger::Text('q')
        );
    }

    #[test]
    fn filtering_turns_letters_into_text() {
        let filtering = InputContext {
            view: View::Browsing(BrowseKind::Tool),
            focus: Focus::Main,
            filtering: true,
        };
        assert_eq!(classify(key(KeyCode::Char('t')), filtering), Trigger::Text('t'));
        assert_eq!(classify(key(KeyCode::Esc), filtering), Trigger::Cancel);
        assert_eq!(classify(key(KeyCode::Enter), filtering), Trigger::Select);
    }

    #[test]
    fn debug_focus_only_scrolls() {
        let debug = ctx(View::Browsing(BrowseKind::Tool), Focus::Debug);
        assert_eq!(classify(key(KeyCode::Char('k')), debug), Trigger::Up);
        assert_eq!(classify(key(KeyCode::PageDown), debug), Trigger::PageDown);
        assert_eq!(classify(key(KeyCode::Enter), debug), Trigger::Ignored);
        assert_eq!(classify(key(KeyCode::Char('r')), debug), Trigger::Ignored);
        assert_eq!(classify(key(KeyCode::Esc), debug), Trigger::Cancel);
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut release = key(KeyCode::Enter);
        release.kind = KeyEventKind::Release;
        assert_eq!(classify(release, ctx(View::ArgumentEntry, Focus::Main)), Trigger::Ignored);
    }

    #[test]
    fn result_views_copy_and_scroll() {
        let result = ctx(View::ResultDisplay, Focus::Main);
        assert_eq!(classify(key(KeyCode::Char('y')), result), Trigger::Copy);
        assert_eq!(classify(key(KeyCode::Char('j')), result), Trigger::Down);
        assert_eq!(classify(key(KeyCode::F(5)), result), Trigger::Ignored);
    }
}

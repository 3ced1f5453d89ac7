// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Pane, title, footer, and style helpers used by TUI rendering.
fn panel_border_style_for_focus(active: Focus, panel: Focus) -> Style {
    if active != panel {
        return Style::default();
    }

    Style::default().fg(FOCUS_COLOR)
}

fn view_title(label: &str, key: char, tail: Option<&str>) -> String {
    let mut title = format!("─[{key}]─ {label}");
    if let Some(tail) = tail {
        let tail = tail.trim();
        if !tail.is_empty() {
            title.push(' ');
            title.push_str(tail);
        }
    }
    title.push(' ');
    title
}

fn kind_key(kind: BrowseKind) -> char {
    match kind {
        BrowseKind::Tool => 't',
        BrowseKind::Resource => 'r',
        BrowseKind::Prompt => 'p',
    }
}

fn list_counter_label(cursor: usize, visible: usize, total: usize) -> String {
    if visible == 0 {
        return format!("[0/{total}]");
    }

    let width = total.to_string().len();
    let position = (cursor + 1).min(visible);
    if visible == total {
        format!("[{position:0width$}/{total}]")
    } else {
        format!("[{position:0width$}/{visible} of {total}]")
    }
}

fn main_pane_title(controller: &SessionController) -> String {
    match controller.view() {
        View::Browsing(kind) => {
            let counter = list_counter_label(
                controller.cursor(kind),
                controller.visible_entries(kind).len(),
                controller.catalog().len_of(kind),
            );
            view_title(kind.label(), kind_key(kind), Some(&counter))
        }
        View::ArgumentEntry => {
            let name = controller.form().map(|form| form.operation_name()).unwrap_or_default();
            format!("─ Arguments: {name} ")
        }
        View::ResultDisplay => {
            let name = controller.result().map(|result| result.title()).unwrap_or_default();
            format!("─ Result: {name} ")
        }
        View::ResourceDetail => {
            let locator = controller.detail_locator().unwrap_or_default();
            format!("─ Resource: {locator} ")
        }
    }
}

fn render_browsing(
    frame: &mut Frame<'_>,
    controller: &SessionController,
    kind: BrowseKind,
    area: Rect,
) {
    let (filter_area, list_area) = match controller.filter_query() {
        Some(query) => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)])
                .split(area);
            let style = if controller.is_filtering() {
                Style::default().fg(FOCUS_COLOR)
            } else {
                Style::default().fg(FOOTER_LABEL_COLOR)
            };
            frame.render_widget(Paragraph::new(format!("/{query}")).style(style), rows[0]);
            (Some(rows[0]), rows[1])
        }
        None => (None, area),
    };

    let entries = controller.catalog().entries(kind);
    let visible = controller.visible_entries(kind);
    if visible.is_empty() {
        let message = if filter_area.is_some() {
            "No matches."
        } else {
            "Nothing listed by the server."
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(DESCRIPTION_COLOR)),
            list_area,
        );
        return;
    }

    let items = visible
        .iter()
        .map(|&idx| {
            let (name, description) = entries[idx];
            let mut spans =
                vec![Span::styled(name.to_owned(), Style::default().add_modifier(Modifier::BOLD))];
            if !description.is_empty() {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    first_line(description).to_owned(),
                    Style::default().fg(DESCRIPTION_COLOR),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect::<Vec<_>>();

    let highlight = if controller.focus() == Focus::Main {
        Style::default().bg(FOCUS_COLOR).fg(Color::Black)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };
    let list = List::new(items).highlight_style(highlight).highlight_symbol("› ");
    let mut state = ListState::default().with_selected(Some(controller.cursor(kind)));
    frame.render_stateful_widget(list, list_area, &mut state);
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn render_argument_entry(frame: &mut Frame<'_>, controller: &SessionController, area: Rect) {
    let Some(form) = controller.form() else {
        return;
    };
    if area.is_empty() {
        return;
    }

    let mut lines = Vec::<Line<'static>>::new();
    let mut cursor_at = None::<(u16, usize)>;
    for field in form.fields() {
        let marker = if field.required() { "*" } else { "" };
        let label_style = if field.is_focused() {
            Style::default().fg(FOCUS_COLOR).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{marker}", field.name()), label_style),
            Span::styled(
                format!(" ({})", field.param_type()),
                Style::default().fg(FOOTER_LABEL_COLOR),
            ),
        ]));

        let prompt = if field.is_focused() { "> " } else { "  " };
        let value = if field.text().is_empty() {
            Span::styled(field.description().to_owned(), Style::default().fg(DESCRIPTION_COLOR))
        } else if field.is_focused() {
            let room = usize::from(area.width).saturating_sub(prompt.len());
            let (visible, column) = scroll_input(field.text(), field.cursor(), room);
            cursor_at = Some((lines.len() as u16, prompt.len() + column));
            Span::raw(visible)
        } else {
            Span::raw(field.text().to_owned())
        };
        if field.is_focused() && cursor_at.is_none() {
            cursor_at = Some((lines.len() as u16, prompt.len()));
        }
        lines.push(Line::from(vec![Span::raw(prompt), value]));
        lines.push(Line::default());
    }

    let hint = if form.is_last_focused() { "enter: call" } else { "enter: next field" };
    lines.push(Line::styled(hint, Style::default().fg(FOOTER_LABEL_COLOR)));

    let overflow = cursor_at
        .map(|(row, _)| (row + 1).saturating_sub(area.height))
        .unwrap_or_default();
    frame.render_widget(Paragraph::new(lines).scroll((overflow, 0)), area);

    if controller.focus() == Focus::Main {
        if let Some((row, col)) = cursor_at {
            let x = area.x.saturating_add(col.min(usize::from(u16::MAX)) as u16);
            let y = area.y.saturating_add(row.saturating_sub(overflow));
            if x < area.right() && y < area.bottom() {
                frame.set_cursor(x, y);
            }
        }
    }
}

/// Keeps the input cursor inside `room` columns by dropping leading chars.
///
/// Returns the visible text and the cursor's display column within it.
fn scroll_input(text: &str, cursor: usize, room: usize) -> (String, usize) {
    let chars = text.chars().collect::<Vec<_>>();
    let cursor = cursor.min(chars.len());
    let width = |from: usize, to: usize| {
        Span::raw(chars[from..to].iter().collect::<String>()).width()
    };

    let mut start = 0;
    while start < cursor && width(start, cursor) >= room.max(1) {
        start += 1;
    }
    (chars[start..].iter().collect(), width(start, cursor))
}

fn render_result(frame: &mut Frame<'_>, controller: &SessionController, area: Rect) {
    let Some(result) = controller.result() else {
        let target = controller
            .pending()
            .map(|pending| pending.label().to_owned())
            .or_else(|| controller.detail_locator().map(str::to_owned))
            .unwrap_or_default();
        frame.render_widget(
            Paragraph::new(format!("Reading {target}…"))
                .style(Style::default().fg(DESCRIPTION_COLOR)),
            area,
        );
        return;
    };

    let style = if result.outcome().is_success() {
        Style::default()
    } else {
        Style::default().fg(ERROR_COLOR)
    };
    let lines = result
        .outcome()
        .rendered_text()
        .split('\n')
        .skip(result.scroll())
        .take(usize::from(area.height))
        .map(|line| Line::raw(line.to_owned()))
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines).style(style), area);
}

fn render_debug_pane(frame: &mut Frame<'_>, controller: &SessionController, area: Rect) {
    let log = controller.log();
    let mut title = String::from("─ Debug log ");
    if log.is_pinned() {
        title.push_str("[pinned] ");
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border_style_for_focus(controller.focus(), Focus::Debug))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = log
        .lines()
        .skip(log.scroll())
        .take(usize::from(inner.height))
        .map(|line| Line::raw(line.to_owned()))
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn footer_help_line(controller: &SessionController) -> Line<'static> {
    let mut spans = Vec::<Span<'static>>::new();
    let mut quit_shown = false;

    if controller.focus() == Focus::Debug {
        push_footer_entry(&mut spans, "SCROLL", "↑↓ PgUp PgDn");
        push_footer_entry(&mut spans, "MAIN", "tab");
    } else {
        match controller.view() {
            View::Browsing(_) if controller.is_filtering() => {
                push_footer_entry(&mut spans, "FILTER", "type");
                push_footer_entry(&mut spans, "KEEP", "enter");
                push_footer_entry(&mut spans, "CLEAR", "esc");
            }
            View::Browsing(kind) => {
                let select = match kind {
                    BrowseKind::Tool => "CALL",
                    BrowseKind::Resource => "READ",
                    BrowseKind::Prompt => "INFO",
                };
                push_footer_entry(&mut spans, select, "enter");
                push_footer_entry(&mut spans, "KIND", "t r p");
                push_footer_entry(&mut spans, "FILTER", "/");
                push_footer_entry(&mut spans, "LOG", "tab");
                push_footer_entry(&mut spans, "QUIT", "q");
                quit_shown = true;
            }
            View::ArgumentEntry => {
                push_footer_entry(&mut spans, "NEXT", "enter");
                push_footer_entry(&mut spans, "CYCLE", "tab");
                push_footer_entry(&mut spans, "LOG", "shift+tab");
                push_footer_entry(&mut spans, "BACK", "esc");
            }
            View::ResultDisplay | View::ResourceDetail => {
                push_footer_entry(&mut spans, "SCROLL", "↑↓");
                push_footer_entry(&mut spans, "COPY", "y");
                push_footer_entry(&mut spans, "BACK", "esc");
            }
        }
    }
    if !quit_shown {
        push_footer_entry(&mut spans, "QUIT", "ctrl+c");
    }

    if let Some(pending) = controller.pending() {
        spans.push(Span::styled(
            format!("  waiting for {} {}", pending.job(), pending.label()),
            Style::default().fg(FOOTER_KEY_COLOR),
        ));
    } else if let Some(toast) = controller.toast() {
        spans.push(Span::styled(format!("  {toast}"), Style::default().fg(FOOTER_KEY_COLOR)));
    }

    Line::from(spans)
}

fn push_footer_entry(spans: &mut Vec<Span<'static>>, label: &str, value: &str) {
    if !spans.is_empty() {
        spans.push(Span::styled(" | ".to_owned(), Style::default().fg(FOOTER_LABEL_COLOR)));
    }
    spans.push(Span::styled(
        format!("{}:", footer_label_ucfirst(label)),
        Style::default().fg(FOOTER_LABEL_COLOR),
    ));
    spans.push(Span::styled(
        value.to_owned(),
        Style::default().fg(FOOTER_KEY_COLOR).add_modifier(Modifier::BOLD),
    ));
}

fn footer_label_ucfirst(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut chars = lower.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = first.to_uppercase().collect::<String>();
    out.push_str(chars.as_str());
    out
}

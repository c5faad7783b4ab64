//! UI rendering.
//!
//! Draws the four boards, the forms and the overlays with ratatui. Nothing
//! here mutates the [`App`].

use chrono::{Datelike, Local, NaiveDate, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use opac_tui::board::{EditSession, NotificationLevel};
use opac_tui::models::{Task, TaskStatus};
use opac_tui::view::{Period, ProjectFilter};
use opac_tui::worker::BoardId;

use crate::app::{dashboard_column, App, FormDraft, FormField, FormState, Tab};
use crate::theme::{colors, due_color, priority_color, project_color, status_color, styles};

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(colors::BG_DARK)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs and status
            Constraint::Min(10),   // Board
            Constraint::Length(6), // Log
        ])
        .split(area);

    let today = Local::now().date_naive();
    render_tabs(frame, app, chunks[0]);
    match app.active_tab {
        Tab::Dashboard => render_dashboard(frame, app, today, chunks[1]),
        Tab::Projects => render_projects(frame, app, chunks[1]),
        Tab::Kanban => render_kanban(frame, app, today, chunks[1]),
        Tab::Timeline => render_timeline(frame, app, today, chunks[1]),
    }
    render_logs(frame, app, chunks[2]);

    if app.form_state.is_some() {
        render_form_modal(frame, app, today, area);
    }
    if app.confirm_dialog.is_some() {
        render_confirm_dialog(frame, app, area);
    }
    if app.error_popup.is_some() {
        render_error_popup(frame, app, area);
    }
    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let style = if *tab == app.active_tab {
                styles::TAB_ACTIVE
            } else {
                styles::TEXT_DIM
            };
            Line::from(Span::styled(format!(" {} {} ", i + 1, tab.name()), style))
        })
        .collect();

    let status_style = if app.api_connected {
        Style::default().fg(colors::STATUS_CONNECTED)
    } else {
        Style::default().fg(colors::STATUS_DISCONNECTED)
    };
    let selected = Tab::all()
        .iter()
        .position(|t| *t == app.active_tab)
        .unwrap_or_default();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(" OPAC Tasks ")
                .title_style(styles::TITLE)
                .title(Line::styled(format!(" {} ", app.status_text()), status_style).right_aligned())
                .borders(Borders::ALL)
                .border_style(styles::BORDER)
                .style(Style::default().bg(colors::BG_MEDIUM)),
        )
        .select(selected)
        .style(styles::TEXT)
        .highlight_style(styles::TAB_ACTIVE)
        .divider(Span::styled(" | ", styles::BORDER_DIM));

    frame.render_widget(tabs, area);
}

// ============================================
// Boards
// ============================================

fn board_block(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(styles::TITLE_ACCENT)
        .borders(Borders::ALL)
        .border_style(if focused {
            styles::BORDER_FOCUSED
        } else {
            styles::BORDER_DIM
        })
        .style(Style::default().bg(colors::BG_DARK))
}

/// One task row: priority marker, title, project and deadline
fn task_line<'a>(app: &'a App, task: &'a Task, today: NaiveDate, selected: bool) -> Line<'a> {
    let title_style = if selected {
        styles::SELECTED
    } else {
        styles::TEXT
    };
    let deadline = task
        .deadline
        .map(|d| d.format("%d %b").to_string())
        .unwrap_or_else(|| "—".to_string());
    let project_style = match task.project_id {
        Some(id) => Style::default().fg(project_color(id)),
        None => styles::TEXT_HINT,
    };

    Line::from(vec![
        Span::styled("● ", Style::default().fg(priority_color(task.priority))),
        Span::styled(task.display_title(), title_style),
        Span::styled("  ", Style::default()),
        Span::styled(app.project_name(task.project_id), project_style),
        Span::styled("  ", Style::default()),
        Span::styled(deadline, Style::default().fg(due_color(task.due_state(today)))),
    ])
}

fn render_dashboard(frame: &mut Frame, app: &App, today: NaiveDate, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let Some(dashboard) = &app.dashboard else {
        render_empty_state(frame, area, "No data", true);
        return;
    };

    for (i, title) in ["Due soon", "High priority"].into_iter().enumerate() {
        let tasks = dashboard_column(dashboard, i);
        let focused = app.selection.dashboard_column == i;
        let items: Vec<ListItem> = tasks
            .iter()
            .enumerate()
            .map(|(row, task)| {
                let selected = focused && row == app.selection.dashboard_row;
                ListItem::new(task_line(app, task, today, selected))
            })
            .collect();
        let list = List::new(items).block(board_block(
            format!(" {} ({}) ", title, tasks.len()),
            focused,
        ));
        frame.render_widget(list, columns[i]);
        if tasks.is_empty() {
            render_empty_state(
                frame,
                columns[i],
                "Nothing here",
                app.is_board_loading(BoardId::Dashboard),
            );
        }
    }
}

fn progress_bar(percent: u8, width: usize) -> String {
    let filled = (percent as usize * width / 100).min(width);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

fn render_projects(frame: &mut Frame, app: &App, area: Rect) {
    let views = app.projects.as_ref().map(|p| p.projects.as_slice()).unwrap_or_default();
    let items: Vec<ListItem> = views
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let is_selected = i == app.selection.projects_row;
            let style = if is_selected {
                styles::SELECTED
            } else {
                Style::default().fg(project_color(view.project.id))
            };

            let (bar, counts, bar_style) = match view.stats() {
                Some(stats) => {
                    let percent = stats.progress_percent();
                    let color = if stats.total == 0 {
                        colors::FG_HINT
                    } else if stats.done == stats.total {
                        colors::GREEN
                    } else if percent >= 50 {
                        colors::YELLOW
                    } else {
                        colors::ORANGE
                    };
                    (
                        progress_bar(percent, 10),
                        format!("{}/{} done, {} in progress", stats.done, stats.total, stats.in_progress),
                        Style::default().fg(color),
                    )
                }
                None => (progress_bar(0, 10), "stats unavailable".to_string(), styles::TEXT_HINT),
            };

            let description = if view.project.description.is_empty() {
                "-"
            } else {
                view.project.description.as_str()
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:24}", view.project.display_name()), style),
                Span::styled(" │ ", styles::BORDER_DIM),
                Span::styled(format!("{:32.32}", description), styles::TEXT_DIM),
                Span::styled(" │ ", styles::BORDER_DIM),
                Span::styled(bar, bar_style),
                Span::styled(" ", Style::default()),
                Span::styled(counts, bar_style),
            ]))
        })
        .collect();

    let list = List::new(items).block(board_block(" Projects ".to_string(), true));
    frame.render_widget(list, area);

    if views.is_empty() {
        render_empty_state(
            frame,
            area,
            "No projects yet, press c to create one",
            app.is_board_loading(BoardId::Projects),
        );
    }
}

fn render_kanban(frame: &mut Frame, app: &App, today: NaiveDate, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let Some(kanban) = &app.kanban else {
        render_empty_state(frame, area, "No data", true);
        return;
    };

    let scope = match &kanban.project {
        Some(project) => project.display_name().to_string(),
        None => "All projects".to_string(),
    };
    let config = &kanban.config;
    let header = Line::from(vec![
        Span::styled(format!(" {scope} "), styles::TITLE_ACCENT),
        Span::styled(
            format!(
                " status: {}  priority: {}  sort: {} {}  ({}% done)",
                config.status.label(),
                config.priority.label(),
                config.sort_key.name(),
                config.sort_order.arrow(),
                kanban.view.counts.progress_percent(),
            ),
            styles::TEXT_DIM,
        ),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[1]);

    for (i, &status) in TaskStatus::all().iter().enumerate() {
        let tasks = kanban.view.columns.column(status);
        let focused = app.selection.kanban_column == status;
        let items: Vec<ListItem> = tasks
            .iter()
            .enumerate()
            .map(|(row, task)| {
                let selected = focused && row == app.selection.kanban_row;
                ListItem::new(task_line(app, task, today, selected))
            })
            .collect();
        let block = board_block(
            format!(" {} ({}) ", status, kanban.view.counts.get(status)),
            focused,
        )
        .title_style(
            Style::default()
                .fg(status_color(status))
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(List::new(items).block(block), columns[i]);
    }
}

fn render_timeline(frame: &mut Frame, app: &App, today: NaiveDate, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let Some(timeline) = &app.timeline else {
        render_empty_state(frame, area, "No data", true);
        return;
    };

    let config = &timeline.config;
    let project = match config.project {
        ProjectFilter::All => "All projects",
        ProjectFilter::Only(id) => app.project_name(Some(id)),
    };
    let stats = &timeline.stats;
    let header = Line::from(vec![
        Span::styled(
            format!(" {} by {} ", period_label(config.period, today), config.date_field.name()),
            styles::TITLE_ACCENT,
        ),
        Span::styled(
            format!(" {} · status: {} ", project, config.status.label()),
            styles::TEXT_DIM,
        ),
        Span::styled(format!(" {} total ", stats.total), styles::TEXT),
        Span::styled(format!(" {} upcoming ", stats.upcoming), styles::INFO),
        Span::styled(format!(" {} overdue ", stats.overdue), styles::ERROR),
        Span::styled(format!(" {} done ", stats.done), styles::SUCCESS),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let mut items: Vec<ListItem> = Vec::new();
    let mut row = 0;
    for bucket in &timeline.buckets {
        items.push(ListItem::new(Line::from(Span::styled(
            format!("{} ({})", bucket.label, bucket.tasks.len()),
            styles::SECTION,
        ))));
        for task in &bucket.tasks {
            let selected = row == app.selection.timeline_row;
            let mut line = task_line(app, task, today, selected);
            line.spans.insert(0, Span::raw("  "));
            line.spans.push(Span::styled(
                format!("  {}", task.status),
                Style::default().fg(status_color(task.status)),
            ));
            items.push(ListItem::new(line));
            row += 1;
        }
    }

    let empty = items.is_empty();
    frame.render_widget(
        List::new(items).block(board_block(" Timeline ".to_string(), true)),
        chunks[1],
    );
    if empty {
        render_empty_state(
            frame,
            chunks[1],
            "No tasks in this period",
            app.is_board_loading(BoardId::Timeline),
        );
    }
}

fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .map(|entry| {
            let (prefix, color) = match entry.level {
                NotificationLevel::Info => ("i", colors::BLUE),
                NotificationLevel::Success => ("+", colors::GREEN),
                NotificationLevel::Warning => ("!", colors::YELLOW),
                NotificationLevel::Error => ("x", colors::RED),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{prefix}] "), Style::default().fg(color)),
                Span::styled(entry.message.as_str(), styles::TEXT_DIM),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Log ")
            .title_style(Style::default().fg(colors::FG_DIM))
            .borders(Borders::ALL)
            .border_style(styles::BORDER_DIM)
            .style(Style::default().bg(colors::BG_DARK)),
    );
    frame.render_widget(list, area);
}

fn render_empty_state(frame: &mut Frame, area: Rect, message: &str, is_loading: bool) {
    let text = if is_loading { "Loading..." } else { message };
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let centered = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
    frame.render_widget(
        Paragraph::new(text)
            .style(styles::TEXT_DIM)
            .alignment(Alignment::Center),
        centered,
    );
}

// ============================================
// Forms and overlays
// ============================================

/// Period name, with the dates of a custom range
fn period_label(period: Period, today: NaiveDate) -> String {
    match (period, period.window(today)) {
        (Period::Custom { .. }, Some((start, end))) => {
            format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
        }
        _ => period.name().to_string(),
    }
}

fn render_form_modal(frame: &mut Frame, app: &App, today: NaiveDate, area: Rect) {
    let Some(form) = &app.form_state else {
        return;
    };

    // fields * 3 + spacer + buttons + status line + margins + borders
    let height = form.fields.iter().filter(|f| !f.is_button()).count() as u16 * 3 + 7;
    let popup_area = centered_rect(60, height, area);
    frame.render_widget(Clear, popup_area);

    let mut block = Block::default()
        .title(form.title())
        .title_style(styles::TITLE)
        .borders(Borders::ALL)
        .border_style(styles::BORDER_FOCUSED)
        .style(Style::default().bg(colors::BG_MEDIUM));
    if let (EditSession::Edit(id), FormDraft::Task(_)) = (form.session, &form.draft) {
        let age = app
            .find_task(id)
            .and_then(|task| task.lifetime(Utc::now().naive_utc()));
        if let Some(age) = age {
            let footer = Line::styled(format!(" open for {age} "), styles::TEXT_HINT);
            block = block.title_bottom(footer.right_aligned());
        }
    }
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let inputs: Vec<FormField> = form.fields.iter().copied().filter(|f| !f.is_button()).collect();
    let mut constraints: Vec<Constraint> = inputs.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(1)); // Spacer
    constraints.push(Constraint::Length(1)); // Buttons
    constraints.push(Constraint::Length(1)); // Error or progress
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    let focused = form.current_field();
    for (field, chunk) in inputs.iter().zip(chunks.iter()) {
        let is_focused = *field == focused;
        if field.is_text_input() {
            render_text_field(frame, field.label(), field_value(app, form, *field), is_focused, *chunk);
        } else if field.is_date_picker() {
            render_date_picker_field(frame, field.label(), field_value(app, form, *field), is_focused, *chunk);
        } else {
            render_selector_field(frame, field.label(), field_value(app, form, *field), is_focused, *chunk);
        }
    }

    render_form_buttons(frame, form, chunks[inputs.len() + 1]);

    let status_area = chunks[inputs.len() + 2];
    if form.submitting {
        frame.render_widget(
            Paragraph::new("Saving...")
                .style(styles::TEXT_DIM)
                .alignment(Alignment::Center),
            status_area,
        );
    } else if let Some(error) = &form.error {
        frame.render_widget(
            Paragraph::new(error.as_str())
                .style(styles::ERROR)
                .alignment(Alignment::Center),
            status_area,
        );
    }

    if let Some(date) = form.current_date() {
        render_mini_calendar(frame, date.unwrap_or(today), today, area, popup_area);
    }
}

fn field_value(app: &App, form: &FormState, field: FormField) -> String {
    match &form.draft {
        FormDraft::Task(draft) => match field {
            FormField::Title => draft.title.clone(),
            FormField::Description => draft.description.clone(),
            FormField::Project => match draft.project_id {
                Some(_) => app.project_name(draft.project_id).to_string(),
                None => "(Select project)".to_string(),
            },
            FormField::Deadline => draft
                .deadline
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "none".to_string()),
            FormField::Priority => draft.priority.to_string(),
            FormField::Status => draft.status.to_string(),
            _ => String::new(),
        },
        FormDraft::Project(draft) => match field {
            FormField::Name => draft.name.clone(),
            FormField::Description => draft.description.clone(),
            _ => String::new(),
        },
        FormDraft::Period { start, end, .. } => {
            let date = if field == FormField::From { start } else { end };
            date.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "open".to_string())
        }
    }
}

fn label_and_input(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(14), Constraint::Min(10)])
        .split(area)
}

fn input_block(is_focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            styles::BORDER_FOCUSED
        } else {
            styles::BORDER_DIM
        })
}

fn render_label(frame: &mut Frame, label: &str, area: Rect) {
    frame.render_widget(
        Paragraph::new(label)
            .style(styles::TEXT_DIM)
            .alignment(Alignment::Right),
        area,
    );
}

fn input_style(is_focused: bool) -> Style {
    if is_focused {
        styles::INPUT_FOCUSED
    } else {
        styles::INPUT
    }
}

fn render_text_field(frame: &mut Frame, label: &str, value: String, is_focused: bool, area: Rect) {
    let chunks = label_and_input(area);
    render_label(frame, label, chunks[0]);
    let cursor = if is_focused { "█" } else { "" };
    let input = Paragraph::new(format!(" {value}{cursor}"))
        .style(input_style(is_focused))
        .block(input_block(is_focused));
    frame.render_widget(input, chunks[1]);
}

fn render_date_picker_field(frame: &mut Frame, label: &str, value: String, is_focused: bool, area: Rect) {
    let chunks = label_and_input(area);
    render_label(frame, label, chunks[0]);
    let hint = if is_focused { "  ◀-7 ▲+1 ▼-1 +7▶ ⌫ clear" } else { "" };
    let input = Paragraph::new(format!(" 📅 {value}{hint}"))
        .style(input_style(is_focused))
        .block(input_block(is_focused));
    frame.render_widget(input, chunks[1]);
}

fn render_selector_field(frame: &mut Frame, label: &str, value: String, is_focused: bool, area: Rect) {
    let chunks = label_and_input(area);
    render_label(frame, label, chunks[0]);
    let arrows = if is_focused { " ▲▼" } else { " ▼" };
    let input = Paragraph::new(format!(" {value}{arrows}"))
        .style(input_style(is_focused))
        .block(input_block(is_focused));
    frame.render_widget(input, chunks[1]);
}

fn render_form_buttons(frame: &mut Frame, form: &FormState, area: Rect) {
    let buttons: Vec<FormField> = form.fields.iter().copied().filter(|f| f.is_button()).collect();
    let mut constraints = vec![Constraint::Fill(1)];
    for _ in &buttons {
        constraints.push(Constraint::Length(12));
        constraints.push(Constraint::Length(2));
    }
    constraints.push(Constraint::Fill(1));
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let focused = form.current_field();
    for (i, button) in buttons.iter().enumerate() {
        let style = match (*button == focused, button) {
            (false, _) => styles::BUTTON,
            (true, FormField::SubmitButton) => styles::BUTTON_FOCUSED,
            (true, _) => styles::BUTTON_DANGER,
        };
        let label = Paragraph::new(format!("[ {} ]", button.label()))
            .style(style)
            .alignment(Alignment::Center);
        frame.render_widget(label, chunks[1 + i * 2]);
    }
}

fn render_confirm_dialog(frame: &mut Frame, app: &App, area: Rect) {
    let Some(dialog) = &app.confirm_dialog else {
        return;
    };

    let popup_area = centered_rect(50, 10, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", dialog.title))
        .title_style(Style::default().fg(colors::RED).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::RED))
        .style(Style::default().bg(colors::BG_MEDIUM));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Message
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Buttons
        ])
        .margin(1)
        .split(inner);

    frame.render_widget(
        Paragraph::new(dialog.message.as_str())
            .style(styles::TEXT)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center),
        chunks[0],
    );

    let button_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(10),
            Constraint::Percentage(10),
            Constraint::Length(10),
            Constraint::Percentage(25),
        ])
        .split(chunks[2]);

    let no_style = if dialog.yes_focused {
        styles::BUTTON
    } else {
        styles::BUTTON_FOCUSED
    };
    let yes_style = if dialog.yes_focused {
        styles::BUTTON_DANGER
    } else {
        styles::BUTTON
    };
    frame.render_widget(
        Paragraph::new("[ No ]").style(no_style).alignment(Alignment::Center),
        button_chunks[1],
    );
    frame.render_widget(
        Paragraph::new("[ Yes ]").style(yes_style).alignment(Alignment::Center),
        button_chunks[3],
    );
}

fn render_error_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(popup) = &app.error_popup else {
        return;
    };

    let popup_width = (area.width * 60 / 100).clamp(30, 60);
    let popup_area = centered_rect(popup_width, 7, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", popup.title))
        .title_style(
            Style::default()
                .fg(colors::FG_PRIMARY)
                .bg(colors::RED)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::RED))
        .style(Style::default().bg(colors::BG_ERROR));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    frame.render_widget(
        Paragraph::new(popup.message.as_str())
            .style(styles::TEXT)
            .wrap(Wrap { trim: true }),
        inner,
    );

    let hint_area = Rect::new(
        popup_area.x,
        popup_area.y + popup_area.height - 1,
        popup_area.width,
        1,
    );
    frame.render_widget(
        Paragraph::new("Press ESC or ENTER to dismiss")
            .style(styles::TEXT_HINT)
            .alignment(Alignment::Center),
        hint_area,
    );
}

fn help_line(keys: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {keys:<16}"), styles::INFO),
        Span::raw(action),
    ])
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(62, 34, area);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled("Keyboard Shortcuts", styles::TITLE_ACCENT)),
        Line::from(""),
        Line::from(Span::styled("Navigation", styles::SECTION)),
        help_line("Tab / 1-4", "Switch board"),
        help_line("j/k or Up/Down", "Move in lists"),
        help_line("h/l", "Switch column"),
        help_line("Enter / e", "Open card (project: open its kanban)"),
        Line::from(""),
        Line::from(Span::styled("Cards and projects", styles::SECTION)),
        help_line("c", "Create task (project on Projects)"),
        help_line("H/L", "Move card to previous/next column"),
        help_line("e / d", "Edit / delete project"),
        Line::from(""),
        Line::from(Span::styled("Views", styles::SECTION)),
        help_line("s / o", "Kanban sort key / order"),
        help_line("f / p", "Status / priority or project filter"),
        help_line("a", "Kanban: show all projects"),
        help_line("v / x / b", "Timeline period / date / grouping"),
        help_line("C", "Timeline: custom period"),
        Line::from(""),
        Line::from(Span::styled("Forms", styles::SECTION)),
        help_line("Tab/Shift+Tab", "Next / previous field"),
        help_line("Up/Down", "Change selector or date (+/-1 day)"),
        help_line("Left/Right", "Date: +/-7 days"),
        help_line("Backspace", "Delete character / clear date"),
        help_line("Enter", "Next field / press button"),
        help_line("Esc", "Close without saving"),
        Line::from(""),
        Line::from(Span::styled("General", styles::SECTION)),
        help_line("r", "Refresh every board"),
        help_line("?", "Toggle help"),
        help_line("q / Ctrl+C", "Quit"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .title_style(styles::TITLE)
                .borders(Borders::ALL)
                .border_style(styles::BORDER)
                .style(Style::default().bg(colors::BG_MEDIUM)),
        )
        .style(styles::TEXT);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// Month grid next to the form with the deadline highlighted
fn render_mini_calendar(
    frame: &mut Frame,
    date: NaiveDate,
    today: NaiveDate,
    screen_area: Rect,
    form_area: Rect,
) {
    let cal_width = 24;
    let cal_height = 10;

    let cal_x = if form_area.x + form_area.width + cal_width + 2 < screen_area.width {
        form_area.x + form_area.width + 1
    } else if form_area.x >= cal_width + 2 {
        form_area.x - cal_width - 1
    } else {
        (screen_area.width.saturating_sub(cal_width)) / 2
    };
    let cal_area = Rect::new(
        cal_x,
        (form_area.y + 2).min(screen_area.height.saturating_sub(cal_height)),
        cal_width,
        cal_height,
    );
    frame.render_widget(Clear, cal_area);

    let first_weekday = date
        .with_day(1)
        .map_or(0, |first| first.weekday().num_days_from_monday() as usize);
    let last_day = days_in_month(date);
    let today_day = (today.year() == date.year() && today.month() == date.month()).then(|| today.day());

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{:^22}", date.format("%B %Y").to_string()),
            styles::TITLE_ACCENT,
        )),
        Line::from(vec![
            Span::styled(" Mo Tu We Th Fr ", styles::TEXT_DIM),
            Span::styled("Sa ", Style::default().fg(colors::BLUE)),
            Span::styled("Su", Style::default().fg(colors::RED)),
        ]),
    ];

    let mut day = 1u32;
    for week in 0..6 {
        let mut spans = vec![Span::raw(" ")];
        for weekday in 0..7 {
            if (week == 0 && weekday < first_weekday) || day > last_day {
                spans.push(Span::raw("   "));
                continue;
            }
            let style = if day == date.day() {
                styles::SELECTED
            } else if today_day == Some(day) {
                Style::default()
                    .fg(colors::YELLOW)
                    .add_modifier(Modifier::BOLD)
            } else if weekday == 5 {
                Style::default().fg(colors::BLUE)
            } else if weekday == 6 {
                Style::default().fg(colors::RED)
            } else {
                styles::TEXT
            };
            spans.push(Span::styled(format!("{day:2} "), style));
            day += 1;
        }
        lines.push(Line::from(spans));
        if day > last_day {
            break;
        }
    }

    let calendar = Paragraph::new(lines).block(
        Block::default()
            .title(" Calendar ")
            .title_style(styles::TITLE)
            .borders(Borders::ALL)
            .border_style(styles::BORDER_FOCUSED)
            .style(Style::default().bg(colors::BG_MEDIUM)),
    );
    frame.render_widget(calendar, cal_area);
}

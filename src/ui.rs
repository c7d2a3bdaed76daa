//! Terminal UI rendering for the taskdeck TUI.
//!
//! Minimal chrome: no box drawing, whitespace as structure, grayscale
//! styling with REVERSED selection so the terminal theme shows through.
//!
//! This module renders from RenderState (immutable snapshot) - it never
//! mutates application state.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::render::{
    DashOverlay, DashboardView, FormView, RenderState, ScreenView, TaskRowView,
};
use crate::task::Priority;
use crate::tea::{Notification, NotificationLevel};

// Color tokens (selection uses REVERSED modifier to adapt to terminal theme)
const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_SEPARATOR: Color = Color::White;

// Priority color coding for faster visual parsing (uses terminal palette)
const COLOR_PRIORITY_LOW: Color = Color::DarkGray;
const COLOR_PRIORITY_MEDIUM: Color = Color::Yellow;
const COLOR_PRIORITY_HIGH: Color = Color::Red;

// Layout constants
const DETAIL_HEIGHT: u16 = 10;

// Column widths for the task list
const PRIORITY_WIDTH: usize = 8;
const DUE_WIDTH: usize = 12;
const STATUS_WIDTH: usize = 12;
const ASSIGNEE_WIDTH: usize = 14;
const SPACING: usize = 2;

// -----------------------------------------------------------------------------
// Context-sensitive keymap system
// -----------------------------------------------------------------------------

/// Context for determining which keybindings to display.
/// Derived from RenderState - this is the "view model" for the statusbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapContext {
    Login,
    Register,
    /// Normal dashboard browsing - shows navigation and task actions
    List { has_selection: bool },
    /// Create or edit form
    Form,
    /// Delete confirmation
    DeleteConfirm,
}

impl KeymapContext {
    /// Derive keymap context from render state.
    pub fn from_render_state(state: &RenderState) -> Self {
        match &state.screen {
            ScreenView::Login(_) => KeymapContext::Login,
            ScreenView::Register(_) => KeymapContext::Register,
            ScreenView::Dashboard(dash) => match dash.overlay {
                DashOverlay::Form(_) => KeymapContext::Form,
                DashOverlay::ConfirmDelete { .. } => KeymapContext::DeleteConfirm,
                DashOverlay::None => KeymapContext::List {
                    has_selection: !dash.tasks.is_empty(),
                },
            },
        }
    }
}

/// A single keybinding entry for display.
struct Keybinding(&'static str, &'static str);

/// A group of related keybindings (separated by │).
struct KeybindingGroup(Vec<Keybinding>);

/// Get keybindings for a given context.
fn keybindings_for_context(ctx: KeymapContext) -> Vec<KeybindingGroup> {
    match ctx {
        KeymapContext::Login => vec![
            KeybindingGroup(vec![
                Keybinding("Enter", "log in"),
                Keybinding("Tab", "field"),
            ]),
            KeybindingGroup(vec![Keybinding("^r", "register")]),
            KeybindingGroup(vec![Keybinding("Esc", "quit")]),
        ],
        KeymapContext::Register => vec![
            KeybindingGroup(vec![
                Keybinding("Enter", "create account"),
                Keybinding("Tab", "field"),
            ]),
            KeybindingGroup(vec![Keybinding("^l", "login"), Keybinding("Esc", "back")]),
        ],
        KeymapContext::List { has_selection } => {
            let task_actions = if has_selection {
                vec![
                    Keybinding("n", "new"),
                    Keybinding("e", "edit"),
                    Keybinding("d", "delete"),
                ]
            } else {
                vec![Keybinding("n", "new")]
            };

            vec![
                KeybindingGroup(task_actions),
                KeybindingGroup(vec![Keybinding("r", "refresh"), Keybinding("l", "logout")]),
                KeybindingGroup(vec![Keybinding("q", "quit")]),
            ]
        }
        KeymapContext::Form => vec![KeybindingGroup(vec![
            Keybinding("Enter", "submit"),
            Keybinding("Tab", "field"),
            Keybinding("←/→", "priority"),
            Keybinding("Esc", "cancel"),
        ])],
        KeymapContext::DeleteConfirm => vec![KeybindingGroup(vec![
            Keybinding("Enter", "delete"),
            Keybinding("Esc", "cancel"),
        ])],
    }
}

/// Main render function - entry point for all UI drawing.
/// Takes an immutable RenderState snapshot.
pub fn draw(frame: &mut Frame, state: &RenderState) {
    let area = frame.area();

    if area.height < 2 {
        return;
    }

    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);

    match &state.screen {
        ScreenView::Login(form) => render_auth_screen(frame, form, &state.server_url, chunks[0]),
        ScreenView::Register(form) => render_auth_screen(frame, form, &state.server_url, chunks[0]),
        ScreenView::Dashboard(dash) => render_dashboard(frame, dash, chunks[0]),
    }

    render_statusbar(frame, state, chunks[1]);

    // Render notification if present
    if let Some(ref notification) = state.notification {
        render_notification(frame, notification, area);
    }
}

// -----------------------------------------------------------------------------
// Auth screens (login / register)
// -----------------------------------------------------------------------------

/// Render a centered auth form: heading, labelled fields, inline error,
/// and the server URL underneath.
fn render_auth_screen(frame: &mut Frame, form: &FormView, server_url: &str, area: Rect) {
    let form_height = (form.fields.len() as u16) + 6;
    let form_width = 44.min(area.width);
    let x = area.x + area.width.saturating_sub(form_width) / 2;
    let y = area.y + area.height.saturating_sub(form_height) / 3;
    let form_area = Rect {
        x,
        y,
        width: form_width,
        height: form_height.min(area.height),
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        form.heading,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::default());
    lines.extend(form.fields.iter().map(|f| field_line(f.label, &f.value, f.focused)));
    lines.push(Line::default());

    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::default());
    }

    lines.push(Line::from(Span::styled(
        format!("Server: {}", server_url),
        Style::default().fg(COLOR_TEXT_MUTED),
    )));

    frame.render_widget(Paragraph::new(lines), form_area);
}

/// Render "Label      value" with a blinking cursor on the focused field.
fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_TEXT_DIMMED)
    };
    let marker = if focused { "▸ " } else { "  " };

    let mut spans = vec![
        Span::styled(marker.to_string(), label_style),
        Span::styled(format!("{:<12}", label), label_style),
        Span::styled(value.to_string(), Style::default().fg(Color::White)),
    ];
    if focused {
        spans.push(Span::styled(
            "_",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    Line::from(spans)
}

// -----------------------------------------------------------------------------
// Dashboard
// -----------------------------------------------------------------------------

/// Render the dashboard: task list + separator + detail/form area.
fn render_dashboard(frame: &mut Frame, dash: &DashboardView, area: Rect) {
    if area.height < 4 {
        render_task_list(frame, dash, area);
        return;
    }

    let detail_height = DETAIL_HEIGHT.min(area.height.saturating_sub(3));
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(detail_height),
    ])
    .split(area);

    render_task_list(frame, dash, chunks[0]);
    render_separator(frame, chunks[1]);

    match &dash.overlay {
        DashOverlay::Form(form) => render_task_form(frame, form, chunks[2]),
        _ => render_task_detail(frame, dash, chunks[2]),
    }
}

/// Render the task list with scrolloff navigation.
fn render_task_list(frame: &mut Frame, dash: &DashboardView, area: Rect) {
    if dash.tasks.is_empty() {
        let msg = Line::from(Span::styled(
            "No tasks. Press 'n' to create one.",
            Style::default().fg(COLOR_TEXT_DIMMED),
        ));
        frame.render_widget(Paragraph::new(msg), area);
        return;
    }

    // Reserve 1 line for header
    let header_height = 1;
    let content_height = area.height.saturating_sub(header_height as u16) as usize;

    // Scrolloff implementation: keep selection centered
    let center = content_height / 2;
    let start = dash.selected.saturating_sub(center);
    let end = (start + content_height).min(dash.tasks.len());
    let start = end.saturating_sub(content_height);

    let mut lines: Vec<Line> = Vec::with_capacity(content_height + header_height);
    lines.push(render_header_row(area.width));
    lines.extend(
        dash.tasks
            .iter()
            .enumerate()
            .skip(start)
            .take(content_height)
            .map(|(idx, task)| render_task_row(task, idx == dash.selected, area.width)),
    );

    frame.render_widget(Paragraph::new(lines), area);
}

/// Render the column header row (bold to distinguish from data rows).
fn render_header_row(width: u16) -> Line<'static> {
    let header_style = Style::default()
        .fg(COLOR_TEXT_DIMMED)
        .add_modifier(Modifier::BOLD);
    let spacing = "  ";

    // Minimum usable width check
    if width < 20 {
        return Line::from(Span::styled("TASK", header_style));
    }

    let total_fixed = PRIORITY_WIDTH + DUE_WIDTH + STATUS_WIDTH + ASSIGNEE_WIDTH + SPACING * 4;
    let title_width = (width as usize).saturating_sub(total_fixed);

    let priority = format!("{:<width$}", "PRI", width = PRIORITY_WIDTH);
    let title = format!("{:<width$}", "TASK", width = title_width);
    let due = format!("{:<width$}", "DUE", width = DUE_WIDTH);
    let status = format!("{:<width$}", "STATUS", width = STATUS_WIDTH);
    let assignee = format!("{:<width$}", "ASSIGNEE", width = ASSIGNEE_WIDTH);

    Line::from(vec![
        Span::styled(priority, header_style),
        Span::styled(spacing, header_style),
        Span::styled(title, header_style),
        Span::styled(spacing, header_style),
        Span::styled(due, header_style),
        Span::styled(spacing, header_style),
        Span::styled(status, header_style),
        Span::styled(spacing, header_style),
        Span::styled(assignee, header_style),
    ])
}

/// Render a single task row with column layout.
/// Columns: PRI (~8ch) | TASK (flex) | DUE (~12ch) | STATUS (~12ch) | ASSIGNEE (~14ch)
fn render_task_row(task: &TaskRowView, is_selected: bool, width: u16) -> Line<'static> {
    if width < 20 {
        let style = if is_selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        return Line::from(Span::styled(truncate(&task.title, width as usize), style));
    }

    let total_fixed = PRIORITY_WIDTH + DUE_WIDTH + STATUS_WIDTH + ASSIGNEE_WIDTH + SPACING * 4;
    let title_width = (width as usize).saturating_sub(total_fixed);

    let priority_padded = format!("{:<width$}", task.priority.label(), width = PRIORITY_WIDTH);
    let title = truncate(&task.title, title_width);
    let title_padded = format!("{:<width$}", title, width = title_width);
    let due_padded = format!("{:<width$}", truncate(&task.due, DUE_WIDTH), width = DUE_WIDTH);
    let status_padded = format!(
        "{:<width$}",
        truncate(&task.status, STATUS_WIDTH),
        width = STATUS_WIDTH
    );
    let assignee_padded = format!(
        "{:<width$}",
        truncate(&task.assigned_to, ASSIGNEE_WIDTH),
        width = ASSIGNEE_WIDTH
    );

    let spacing = "  ";
    let priority_color = match task.priority {
        Priority::Low => COLOR_PRIORITY_LOW,
        Priority::Medium => COLOR_PRIORITY_MEDIUM,
        Priority::High => COLOR_PRIORITY_HIGH,
    };

    let (priority_style, primary_style, secondary_style) = if is_selected {
        let selected = Style::default().add_modifier(Modifier::REVERSED);
        (selected, selected, selected)
    } else {
        (
            Style::default().fg(priority_color),
            Style::default(),
            Style::default().fg(COLOR_TEXT_DIMMED),
        )
    };

    Line::from(vec![
        Span::styled(priority_padded, priority_style),
        Span::styled(spacing, primary_style),
        Span::styled(title_padded, primary_style),
        Span::styled(spacing, primary_style),
        Span::styled(due_padded, secondary_style),
        Span::styled(spacing, primary_style),
        Span::styled(status_padded, secondary_style),
        Span::styled(spacing, primary_style),
        Span::styled(assignee_padded, secondary_style),
    ])
}

/// Render the separator - solid divider line between list and detail area.
fn render_separator(frame: &mut Frame, area: Rect) {
    let solid = "─".repeat(area.width as usize);
    let line = Line::from(Span::styled(solid, Style::default().fg(COLOR_SEPARATOR)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the selected task's detail: description and provenance.
fn render_task_detail(frame: &mut Frame, dash: &DashboardView, area: Rect) {
    let Some(task) = dash.tasks.get(dash.selected) else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    if task.description.is_empty() {
        lines.push(Line::from(Span::styled(
            "(no description)",
            Style::default().fg(COLOR_TEXT_MUTED),
        )));
    } else {
        lines.extend(
            task.description
                .lines()
                .map(|l| Line::from(Span::raw(l.to_string()))),
        );
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!(
            "due {}  ·  {} priority  ·  assigned to {}  ·  created by {}",
            task.due,
            task.priority.label(),
            task.assigned_to,
            if task.created_by.is_empty() {
                "?"
            } else {
                task.created_by.as_str()
            }
        ),
        Style::default().fg(COLOR_TEXT_DIMMED),
    )));

    frame.render_widget(Paragraph::new(lines), area);
}

/// Render the create/edit form in the detail area.
fn render_task_form(frame: &mut Frame, form: &FormView, area: Rect) {
    let mut lines = vec![Line::from(Span::styled(
        form.heading,
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.extend(form.fields.iter().map(|f| field_line(f.label, &f.value, f.focused)));
    frame.render_widget(Paragraph::new(lines), area);
}

// -----------------------------------------------------------------------------
// Statusbar
// -----------------------------------------------------------------------------

/// Render the single bottom line: either the delete confirmation prompt or
/// the '?'-toggled keymap legend.
fn render_statusbar(frame: &mut Frame, state: &RenderState, area: Rect) {
    let line = match &state.screen {
        ScreenView::Dashboard(DashboardView {
            overlay: DashOverlay::ConfirmDelete { title },
            ..
        }) => render_confirm_line(title),
        _ => render_keymap_line(state),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_confirm_line(title: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("Delete '{}'? ", title),
            Style::default().fg(Color::Red),
        ),
        Span::styled("Enter ", Style::default().fg(COLOR_TEXT_DIMMED)),
        Span::styled("confirm", Style::default().fg(COLOR_TEXT_MUTED)),
        Span::styled(" • ", Style::default().fg(COLOR_TEXT_MUTED)),
        Span::styled("Esc ", Style::default().fg(COLOR_TEXT_DIMMED)),
        Span::styled("cancel", Style::default().fg(COLOR_TEXT_MUTED)),
    ])
}

/// Render keybindings legend for the bottom line.
/// When show_keymap is false: Shows just "?" (grayed out)
/// When show_keymap is true: Shows "? │ <full keymap legend>" with bright "?"
fn render_keymap_line(state: &RenderState) -> Line<'static> {
    let ctx = KeymapContext::from_render_state(state);
    let groups = keybindings_for_context(ctx);

    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);
    let sep_style = Style::default().fg(COLOR_TEXT_MUTED);

    let mut spans: Vec<Span> = Vec::new();

    let help_style = if state.show_keymap {
        Style::default() // Bright (default foreground)
    } else {
        Style::default().fg(COLOR_TEXT_MUTED) // Grayed out
    };
    spans.push(Span::styled("?", help_style));

    // Auth screens always show their keymap; the dashboard only when expanded
    let expanded = state.show_keymap
        || matches!(ctx, KeymapContext::Login | KeymapContext::Register | KeymapContext::Form);

    if expanded {
        for group in groups.iter() {
            if group.0.is_empty() {
                continue;
            }

            spans.push(Span::styled(" │ ", sep_style));

            for (key_idx, keybinding) in group.0.iter().enumerate() {
                if key_idx > 0 {
                    spans.push(Span::styled(" • ", sep_style));
                }
                spans.push(Span::styled(keybinding.0, key_style));
                spans.push(Span::styled(format!(" {}", keybinding.1), desc_style));
            }
        }
    }

    Line::from(spans)
}

/// Render notification message on the bottom line of the screen.
///
/// - Error: Red text with "Error:" prefix and bold styling
/// - Info: Green text without prefix
fn render_notification(frame: &mut Frame, notification: &Notification, area: Rect) {
    let notification_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    frame.render_widget(Clear, notification_area);

    let line = match notification.level {
        NotificationLevel::Error => Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                notification.message.clone(),
                Style::default().fg(Color::Red),
            ),
        ]),
        NotificationLevel::Info => Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(Color::Green),
        )),
    };

    frame.render_widget(Paragraph::new(line), notification_area);
}

// Helper functions

fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

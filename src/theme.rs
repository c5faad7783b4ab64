//! Kanagawa Dragon palette and the styles the boards draw with.

use ratatui::style::{Color, Modifier, Style};

use opac_tui::models::{DueState, Priority, TaskStatus};

pub mod colors {
    use super::Color;

    pub const BG_DARK: Color = Color::Rgb(0x18, 0x16, 0x16);
    pub const BG_MEDIUM: Color = Color::Rgb(0x1D, 0x1C, 0x19);
    pub const BG_HIGHLIGHT: Color = Color::Rgb(0x28, 0x27, 0x27);
    /// Behind the error popup
    pub const BG_ERROR: Color = Color::Rgb(0x2A, 0x18, 0x18);

    pub const FG_PRIMARY: Color = Color::Rgb(0xC5, 0xC9, 0xC5);
    pub const FG_DIM: Color = Color::Rgb(0x72, 0x71, 0x69);
    pub const FG_HINT: Color = Color::Rgb(0x54, 0x54, 0x54);

    pub const RED: Color = Color::Rgb(0xC4, 0x74, 0x6E);
    pub const GREEN: Color = Color::Rgb(0x8A, 0x9A, 0x7B);
    pub const YELLOW: Color = Color::Rgb(0xC4, 0xB2, 0x8A);
    pub const ORANGE: Color = Color::Rgb(0xB6, 0x92, 0x7B);
    pub const BLUE: Color = Color::Rgb(0x8B, 0xA4, 0xB0);
    pub const PURPLE: Color = Color::Rgb(0x95, 0x7F, 0xB8);

    pub const BORDER: Color = FG_DIM;
    pub const BORDER_DIM: Color = Color::Rgb(0x3A, 0x3A, 0x3A);

    pub const STATUS_CONNECTED: Color = GREEN;
    pub const STATUS_DISCONNECTED: Color = RED;
}

/// Project name colors, picked by id
const PROJECT_COLORS: [Color; 8] = [
    Color::Rgb(0x7A, 0xA2, 0xF7),
    Color::Rgb(0x9E, 0xCE, 0x6A),
    Color::Rgb(0xE0, 0xAF, 0x68),
    Color::Rgb(0xBB, 0x9A, 0xF7),
    Color::Rgb(0xFF, 0x9E, 0x64),
    Color::Rgb(0xF7, 0x76, 0x8E),
    Color::Rgb(0x73, 0xDA, 0xCA),
    Color::Rgb(0xC0, 0xCA, 0xF5),
];

pub fn project_color(project_id: i64) -> Color {
    let index = project_id.rem_euclid(PROJECT_COLORS.len() as i64) as usize;
    PROJECT_COLORS[index]
}

pub fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => colors::BLUE,
        TaskStatus::InProgress => colors::YELLOW,
        TaskStatus::Done => colors::GREEN,
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => colors::FG_DIM,
        Priority::Medium | Priority::Other => colors::ORANGE,
        Priority::High => colors::RED,
    }
}

/// Deadline color of a card
pub fn due_color(state: DueState) -> Color {
    match state {
        DueState::Undated => colors::FG_HINT,
        DueState::Normal => colors::FG_DIM,
        DueState::DueSoon => colors::YELLOW,
        DueState::Overdue => colors::RED,
    }
}

pub mod styles {
    use super::{colors, Modifier, Style};

    const fn fg(color: super::Color) -> Style {
        Style::new().fg(color)
    }

    const fn bold(color: super::Color) -> Style {
        Style::new().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Dark text on a colored background
    const fn badge(bg: super::Color) -> Style {
        Style::new()
            .fg(colors::BG_DARK)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    }

    pub const TEXT: Style = fg(colors::FG_PRIMARY);
    pub const TEXT_DIM: Style = fg(colors::FG_DIM);
    pub const TEXT_HINT: Style = fg(colors::FG_HINT);
    pub const SUCCESS: Style = fg(colors::GREEN);
    pub const ERROR: Style = fg(colors::RED);
    pub const INFO: Style = fg(colors::BLUE);

    pub const TITLE: Style = bold(colors::FG_PRIMARY);
    pub const TITLE_ACCENT: Style = bold(colors::BLUE);
    /// Column and bucket headers
    pub const SECTION: Style = bold(colors::PURPLE);
    pub const TAB_ACTIVE: Style = bold(colors::BLUE);

    pub const BORDER: Style = fg(colors::BORDER);
    pub const BORDER_DIM: Style = fg(colors::BORDER_DIM);
    pub const BORDER_FOCUSED: Style = fg(colors::BLUE);

    pub const SELECTED: Style = badge(colors::BLUE);

    pub const INPUT: Style = Style::new().fg(colors::FG_PRIMARY).bg(colors::BG_MEDIUM);
    pub const INPUT_FOCUSED: Style = Style::new().fg(colors::FG_PRIMARY).bg(colors::BG_HIGHLIGHT);
    pub const BUTTON: Style = INPUT;
    pub const BUTTON_FOCUSED: Style = badge(colors::BLUE);
    /// Focused delete and cancel buttons
    pub const BUTTON_DANGER: Style = badge(colors::RED);
}

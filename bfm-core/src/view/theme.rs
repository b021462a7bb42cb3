//! src/view/theme.rs
//! ============================================================================
//! # Catppuccin Mocha Color Palette
//!
//! Colors are from the official Catppuccin theme specification:
//! https://github.com/catppuccin/catppuccin

use ratatui::style::{Color, Modifier, Style};

use crate::model::ui_state::UIMode;

pub const BACKGROUND: Color = Color::Rgb(30, 30, 46); // Base
pub const CURRENT_LINE: Color = Color::Rgb(69, 71, 90); // Surface1
pub const FOREGROUND: Color = Color::Rgb(205, 214, 244); // Text
pub const COMMENT: Color = Color::Rgb(127, 132, 156); // Overlay1
pub const CYAN: Color = Color::Rgb(137, 220, 235); // Sky
pub const GREEN: Color = Color::Rgb(166, 227, 161); // Green
pub const ORANGE: Color = Color::Rgb(250, 179, 135); // Peach
pub const PINK: Color = Color::Rgb(245, 194, 231); // Pink
pub const PURPLE: Color = Color::Rgb(203, 166, 247); // Mauve
pub const RED: Color = Color::Rgb(243, 139, 168); // Red
pub const YELLOW: Color = Color::Rgb(249, 226, 175); // Yellow

pub fn tab_selected_style() -> Style {
    Style::default()
        .bg(PURPLE)
        .fg(BACKGROUND)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active_style() -> Style {
    Style::default().bg(CURRENT_LINE).fg(FOREGROUND)
}

pub fn tab_inactive_style() -> Style {
    Style::default().bg(BACKGROUND).fg(COMMENT)
}

pub fn cwd_style() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn mode_style(mode: UIMode) -> Style {
    let bg = match mode {
        UIMode::Command => GREEN,
        UIMode::Filter | UIMode::Selected => ORANGE,
    };
    Style::default()
        .bg(bg)
        .fg(BACKGROUND)
        .add_modifier(Modifier::BOLD)
}

pub fn filter_text_style() -> Style {
    Style::default().fg(YELLOW)
}

pub fn stats_style() -> Style {
    Style::default().fg(COMMENT)
}

pub fn directory_style() -> Style {
    Style::default().fg(CYAN)
}

pub fn symlink_style() -> Style {
    Style::default().fg(PINK)
}

pub fn file_style() -> Style {
    Style::default().fg(FOREGROUND)
}

pub fn selected_entry_style() -> Style {
    Style::default().fg(YELLOW).add_modifier(Modifier::BOLD)
}

pub fn cursor_line_style() -> Style {
    Style::default()
        .bg(CURRENT_LINE)
        .add_modifier(Modifier::BOLD)
}

pub fn error_border_style() -> Style {
    Style::default().fg(RED)
}

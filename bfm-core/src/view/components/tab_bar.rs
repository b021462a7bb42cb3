//! src/view/components/tab_bar.rs
//!
//! Header line: the six tab slots, the selection indicator and the working
//! directory.

use ratatui::{prelude::*, widgets::Paragraph};

use crate::{
    config::Config,
    model::{app_state::AppState, fs_state::TAB_COUNT, ui_state::UIMode},
    view::theme,
};

pub struct TabBar;

impl TabBar {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState, config: &Config, area: Rect) {
        let command_mode = state.ui.mode == UIMode::Command;
        let mut spans = Vec::with_capacity(TAB_COUNT + 4);

        for (i, tab) in state.fs.tabs.iter().enumerate() {
            let style = if command_mode && i == state.fs.current {
                theme::tab_selected_style()
            } else if tab.active {
                theme::tab_active_style()
            } else {
                theme::tab_inactive_style()
            };
            spans.push(Span::styled(format!(" {} ", i + 1), style));
        }

        // The selection slot lights up while the selection is being viewed.
        let selection_style = if state.ui.mode == UIMode::Selected {
            theme::tab_selected_style()
        } else if !state.selection.is_empty() {
            theme::tab_active_style()
        } else {
            theme::tab_inactive_style()
        };
        spans.push(Span::styled(" S ", selection_style));
        spans.push(Span::raw(" "));

        let shown = if state.ui.mode == UIMode::Selected {
            "Selected Files".to_string()
        } else {
            config.display_directory(&state.tab().directory)
        };
        spans.push(Span::styled(shown, theme::cwd_style()));

        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::BACKGROUND)),
            area,
        );
    }
}

impl Default for TabBar {
    fn default() -> Self {
        Self::new()
    }
}

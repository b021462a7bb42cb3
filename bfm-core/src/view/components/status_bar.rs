//! src/view/components/status_bar.rs
//!
//! Footer line: input mode, filter text, sort order, cursor position and
//! selection count.

use ratatui::{prelude::*, widgets::Paragraph};

use crate::{
    model::{app_state::AppState, entry_filter::EntrySort, ui_state::UIMode},
    view::theme,
};

pub struct StatusBar;

impl StatusBar {
    pub fn new() -> Self {
        Self
    }

    fn sort_label(sort: EntrySort) -> &'static str {
        match sort {
            EntrySort::ByName => "NAM",
            EntrySort::ByModifiedDesc => "MOD",
            EntrySort::BySizeAsc => "SIZ",
        }
    }

    fn position(state: &AppState) -> String {
        if state.ui.mode == UIMode::Selected {
            let total = state.selection.len();
            let first = (state.ui.selected_view_offset + 1).min(total);
            return format!("{first}/{total}");
        }

        let tab = state.tab();
        let total = tab.filtered_entries.len();
        let current = if total == 0 { 0 } else { tab.cursor + 1 };
        format!("{current}/{total}")
    }

    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let mode = state.ui.mode;
        let tab = state.tab();

        let mut left = vec![Span::styled(format!(" {mode} "), theme::mode_style(mode))];
        if mode == UIMode::Filter || !tab.filter_text.is_empty() {
            left.push(Span::raw(" "));
            left.push(Span::styled(
                format!("»{}", tab.filter_text),
                theme::filter_text_style(),
            ));
        }

        let right = format!(
            "SEL:{}  {}  {}  ? : Help ",
            state.selection.len(),
            Self::sort_label(tab.sort),
            Self::position(state),
        );

        let [left_area, right_area] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(right.chars().count() as u16),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Line::from(left)).style(Style::default().bg(theme::BACKGROUND)),
            left_area,
        );
        frame.render_widget(
            Paragraph::new(right)
                .style(theme::stats_style().bg(theme::BACKGROUND))
                .alignment(Alignment::Right),
            right_area,
        );
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

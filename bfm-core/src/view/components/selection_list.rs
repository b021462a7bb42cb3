//! src/view/components/selection_list.rs

use ratatui::{
    prelude::*,
    widgets::{List, ListItem},
};

use crate::{model::app_state::AppState, view::theme};

/// Read-only listing of every selected path, shown in SELECTED mode.
pub struct SelectionList;

impl SelectionList {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let items: Vec<ListItem> = state
            .selection
            .paths()
            .into_iter()
            .skip(state.ui.selected_view_offset)
            .take(area.height as usize)
            .map(|path| ListItem::new(format!("  {}", path.display())).style(theme::file_style()))
            .collect();

        frame.render_widget(
            List::new(items).style(Style::default().bg(theme::BACKGROUND)),
            area,
        );
    }
}

impl Default for SelectionList {
    fn default() -> Self {
        Self::new()
    }
}

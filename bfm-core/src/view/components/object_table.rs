//! src/view/components/object_table.rs

use std::time::SystemTime;

use ratatui::{
    prelude::*,
    widgets::{Cell, HighlightSpacing, Row, Table, TableState},
};

use crate::{
    fs::object_info::ObjectInfo,
    model::app_state::AppState,
    util::humanize::{compact_age, human_readable_size},
    view::theme,
};

/// Below this width only names are shown.
const FULL_WIDTH: u16 = 50;

/// From this width the modification time is a full timestamp.
const WIDE_WIDTH: u16 = 80;

pub struct EntryTable;

impl EntryTable {
    pub fn new() -> Self {
        Self
    }

    fn name_style(obj: &ObjectInfo, selected: bool) -> Style {
        if selected {
            theme::selected_entry_style()
        } else if obj.is_dir {
            theme::directory_style()
        } else if obj.is_symlink {
            theme::symlink_style()
        } else {
            theme::file_style()
        }
    }

    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let tab = state.tab();
        let full = area.width >= FULL_WIDTH;
        let wide = area.width >= WIDE_WIDTH;
        let now = SystemTime::now();

        let rows: Vec<Row> = tab
            .filtered_entries
            .iter()
            .enumerate()
            .map(|(i, obj)| {
                let selected = state.is_selected(i);
                let name = if obj.is_dir {
                    format!("{}/", obj.name)
                } else {
                    obj.name.to_string()
                };
                let mut cells = vec![Cell::from(name).style(Self::name_style(obj, selected))];

                if full {
                    let age = if wide {
                        obj.modified_display()
                    } else {
                        obj.modified.map(|m| compact_age(m, now)).unwrap_or_default()
                    };
                    let size = match obj.size {
                        Some(size) if !obj.is_dir => human_readable_size(size),
                        _ => String::new(),
                    };
                    cells.push(Cell::from(age).style(theme::stats_style()));
                    cells.push(Cell::from(size).style(theme::stats_style()));
                }

                Row::new(cells)
            })
            .collect();

        let widths: Vec<Constraint> = if full {
            vec![
                Constraint::Fill(1),
                Constraint::Length(if wide { 16 } else { 4 }),
                Constraint::Length(10),
            ]
        } else {
            vec![Constraint::Fill(1)]
        };

        let mut table_state = TableState::default().with_selected(
            (!tab.filtered_entries.is_empty()).then_some(tab.cursor),
        );

        let table = Table::new(rows, widths)
            .style(Style::default().bg(theme::BACKGROUND))
            .row_highlight_style(theme::cursor_line_style())
            .highlight_symbol("> ")
            .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(table, area, &mut table_state);
    }
}

impl Default for EntryTable {
    fn default() -> Self {
        Self::new()
    }
}

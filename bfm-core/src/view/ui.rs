//! src/view/ui.rs
//! ============================================================
//! Frame renderer: header, entry table (or the selection list in SELECTED
//! mode), footer, and the oldest pending error on top.

use ratatui::prelude::*;
use tracing::trace;

use crate::{
    config::Config,
    model::{app_state::AppState, ui_state::UIMode},
    view::components::{
        error_overlay::ErrorOverlay, object_table::EntryTable, selection_list::SelectionList,
        status_bar::StatusBar, tab_bar::TabBar,
    },
};

/// Header and footer rows around the listing.
pub const CHROME_ROWS: u16 = 2;

pub struct UIRenderer {
    cache: LayoutCache,
    frames: u64,
}

#[derive(Default)]
struct LayoutCache {
    screen: Rect,
    /// header, listing, footer
    areas: [Rect; 3],
    hit: u64,
    miss: u64,
}

impl UIRenderer {
    pub fn new() -> Self {
        Self {
            cache: LayoutCache::default(),
            frames: 0,
        }
    }

    pub fn render(&mut self, f: &mut Frame<'_>, state: &AppState, config: &Config) {
        self.update_layout_cache(f.area());
        let [header, listing, footer] = self.cache.areas;

        TabBar::new().render(f, state, config, header);
        match state.ui.mode {
            UIMode::Selected => SelectionList::new().render(f, state, listing),
            UIMode::Command | UIMode::Filter => EntryTable::new().render(f, state, listing),
        }
        StatusBar::new().render(f, state, footer);

        if let Some(message) = state.ui.current_error() {
            let area = self.centered(f.area(), 70, 40);
            ErrorOverlay::new(message, state.ui.errors.len() - 1).render(f, area);
        }

        self.frames += 1;
        trace!("Rendered frame {}", self.frames);
    }

    /// Rows available to the listing for a terminal of `height` rows.
    pub fn listing_height(height: u16) -> u16 {
        height.saturating_sub(CHROME_ROWS)
    }

    fn update_layout_cache(&mut self, scr: Rect) {
        if self.cache.screen == scr && self.cache.miss > 0 {
            self.cache.hit += 1;
            return;
        }

        self.cache.screen = scr;
        self.cache.miss += 1;
        self.cache.areas = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(scr);
    }

    fn centered(&self, r: Rect, w_pct: u16, h_pct: u16) -> Rect {
        let w = (r.width * w_pct / 100).min(r.width);
        let h = (r.height * h_pct / 100).max(5).min(r.height);
        Rect {
            x: r.x + (r.width - w) / 2,
            y: r.y + (r.height - h) / 2,
            width: w,
            height: h,
        }
    }
}

impl Default for UIRenderer {
    fn default() -> Self {
        Self::new()
    }
}

//! UI state: input mode, pending errors and viewport geometry

use std::collections::VecDeque;

use tracing::{debug, warn};

/// Redraw flags, OR-ed together until the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RedrawFlag {
    Main = 1,
    StatusBar = 2,
    Overlay = 4,
    All = 7,
}

impl RedrawFlag {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Process-wide input mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum UIMode {
    #[default]
    Command = 0,

    /// Keystrokes edit the current tab's filter text.
    Filter = 1,

    /// Read-only browsing of the selection set.
    Selected = 2,
}

impl std::fmt::Display for UIMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Command => "COMMAND",
            Self::Filter => "FILTER",
            Self::Selected => "SELECTED",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug)]
pub struct UIState {
    pub redraw_flags: u8,

    pub mode: UIMode,

    /// Pending error queue, oldest first.
    pub errors: VecDeque<String>,

    /// Rows available to the entry table; half-page moves use half of this.
    pub viewport_height: u16,

    /// First visible row of the selected-files view.
    pub selected_view_offset: usize,
}

impl Default for UIState {
    fn default() -> Self {
        Self::new()
    }
}

impl UIState {
    pub fn new() -> Self {
        Self {
            redraw_flags: RedrawFlag::All.bits(),
            mode: UIMode::Command,
            errors: VecDeque::new(),
            viewport_height: 20,
            selected_view_offset: 0,
        }
    }

    #[inline]
    pub fn request_redraw(&mut self, flag: RedrawFlag) {
        self.redraw_flags |= flag.bits();
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.redraw_flags != 0
    }

    #[inline]
    pub fn clear_redraw(&mut self) {
        self.redraw_flags = 0;
    }

    pub fn set_mode(&mut self, mode: UIMode) {
        if self.mode != mode {
            debug!("Mode {} -> {}", self.mode, mode);
            self.mode = mode;
            self.request_redraw(RedrawFlag::All);
        }
    }

    // Error queue

    pub fn push_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.errors.push_back(message);
        self.request_redraw(RedrawFlag::Overlay);
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    /// Drop the oldest error.
    pub fn dismiss_error(&mut self) -> Option<String> {
        let dismissed = self.errors.pop_front();
        self.request_redraw(RedrawFlag::All);
        dismissed
    }

    // Geometry

    pub fn set_viewport_height(&mut self, rows: u16) {
        self.viewport_height = rows.max(1);
    }

    pub fn half_page(&self) -> usize {
        usize::from(self.viewport_height / 2).max(1)
    }

    /// Scroll the selected-files view, keeping at least one row visible.
    pub fn scroll_selected_view(&mut self, delta: isize, total: usize) {
        let max = total.saturating_sub(1);
        self.selected_view_offset = self
            .selected_view_offset
            .saturating_add_signed(delta)
            .min(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_dismissed_oldest_first() {
        let mut ui = UIState::new();
        ui.push_error("first");
        ui.push_error("second");
        assert_eq!(ui.current_error(), Some("first"));
        assert_eq!(ui.dismiss_error().as_deref(), Some("first"));
        assert_eq!(ui.current_error(), Some("second"));
        ui.dismiss_error();
        assert!(!ui.has_errors());
        assert!(ui.dismiss_error().is_none());
    }

    #[test]
    fn test_scroll_selected_view_is_clamped() {
        let mut ui = UIState::new();
        ui.scroll_selected_view(-3, 10);
        assert_eq!(ui.selected_view_offset, 0);
        ui.scroll_selected_view(25, 10);
        assert_eq!(ui.selected_view_offset, 9);
        ui.scroll_selected_view(1, 0);
        assert_eq!(ui.selected_view_offset, 0);
    }

    #[test]
    fn test_half_page_never_zero() {
        let mut ui = UIState::new();
        ui.set_viewport_height(1);
        assert_eq!(ui.half_page(), 1);
        ui.set_viewport_height(30);
        assert_eq!(ui.half_page(), 15);
    }
}

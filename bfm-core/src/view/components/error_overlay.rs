//! src/view/components/error_overlay.rs
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::view::theme;

/// Oldest pending error; any key dismisses it.
pub struct ErrorOverlay<'a> {
    message: &'a str,
    remaining: usize,
}

impl<'a> ErrorOverlay<'a> {
    pub fn new(message: &'a str, remaining: usize) -> Self {
        Self { message, remaining }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let title = if self.remaining > 0 {
            format!(" Error ({} more) ", self.remaining)
        } else {
            " Error ".to_string()
        };

        let block = Block::default()
            .title(title)
            .title_bottom(" press any key ")
            .borders(Borders::ALL)
            .border_style(theme::error_border_style())
            .style(Style::default().bg(theme::BACKGROUND).fg(theme::FOREGROUND));

        let text = Paragraph::new(self.message)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false });

        frame.render_widget(Clear, area);
        frame.render_widget(text, area);
    }
}

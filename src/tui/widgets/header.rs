//! Header bar widget
//!
//! Design: ` codechat │ http http://127.0.0.1:8080 │ 3 messages`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::theme::Theme;

const MAX_LABEL_CHARS: usize = 48;

/// Header bar with branding and the active backend
pub struct Header {
    backend_label: String,
    message_count: usize,
}

impl Header {
    pub fn new(backend_label: &str, message_count: usize) -> Self {
        Self {
            backend_label: Self::truncate_label(backend_label),
            message_count,
        }
    }

    /// Shorten long URLs, keeping char boundaries intact
    fn truncate_label(label: &str) -> String {
        if label.chars().count() > MAX_LABEL_CHARS {
            let kept: String = label.chars().take(MAX_LABEL_CHARS - 3).collect();
            format!("{}...", kept)
        } else {
            label.to_string()
        }
    }
}

impl Widget for Header {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let separator = Style::default().fg(Theme::MUTED);
        let noun = if self.message_count == 1 {
            "message"
        } else {
            "messages"
        };

        let header_line = Line::from(vec![
            Span::styled(
                " codechat",
                Style::default()
                    .fg(Theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", separator),
            Span::styled(self.backend_label, Style::default().fg(Theme::GREEN)),
            Span::styled(" │ ", separator),
            Span::styled(
                format!("{} {}", self.message_count, noun),
                Style::default().fg(Theme::MUTED),
            ),
        ]);

        Paragraph::new(header_line)
            .style(Style::default().bg(Theme::INPUT_BG))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_label() {
        assert_eq!(Header::truncate_label("llm gpt"), "llm gpt");

        let long = format!("http https://{}", "é".repeat(60));
        let shown = Header::truncate_label(&long);
        assert_eq!(shown.chars().count(), MAX_LABEL_CHARS);
        assert!(shown.ends_with("..."));
    }
}

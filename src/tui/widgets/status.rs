//! Status bar widget
//!
//! Displays mode indicator, keybind hints, and transient notices.
//! Format: ` MODE  │ hints... `

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::tui::state::Focus;
use crate::tui::theme::Theme;

/// Status bar widget with mode and hints
pub struct StatusBar {
    is_loading: bool,
    focus: Focus,
    spinner: String,
    notice: Option<String>,
}

impl StatusBar {
    pub fn new(is_loading: bool, focus: Focus) -> Self {
        Self {
            is_loading,
            focus,
            spinner: String::new(),
            notice: None,
        }
    }

    pub fn spinner(mut self, frame: &str) -> Self {
        self.spinner = frame.to_string();
        self
    }

    /// Error notice (shown in red instead of hints)
    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    fn mode_info(&self) -> (String, Color) {
        if self.is_loading {
            (format!("{} WAITING", self.spinner), Theme::YELLOW)
        } else {
            ("READY".to_string(), Theme::GREEN)
        }
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        if self.is_loading {
            &[("Ctrl+Q", "quit"), ("PgUp/PgDn", "scroll")]
        } else {
            match self.focus {
                Focus::Prompt => &[
                    ("Enter", "send"),
                    ("F5", "analyze code"),
                    ("Tab", "code editor"),
                    ("F1", "help"),
                    ("Ctrl+Q", "quit"),
                ],
                Focus::Code => &[
                    ("F5/Ctrl+Enter", "analyze"),
                    ("Tab", "prompt"),
                    ("F1", "help"),
                    ("Ctrl+Q", "quit"),
                ],
            }
        }
    }
}

impl Widget for StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                buf[(x, y)].set_bg(Theme::BG);
            }
        }

        let (mode_text, mode_color) = self.mode_info();
        let separator_style = Style::default().fg(Theme::MUTED);

        let mut spans = vec![
            Span::styled(
                format!(" {} ", mode_text.trim_start()),
                Style::default()
                    .fg(Color::Black)
                    .bg(mode_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", separator_style),
        ];

        if let Some(notice) = &self.notice {
            spans.push(Span::styled(
                format!("⚠ {}", notice),
                Style::default()
                    .fg(Theme::ERROR)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            for (i, (key, action)) in self.hints().iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(" │ ", separator_style));
                }
                spans.push(Span::styled(format!("{}: {}", key, action), separator_style));
            }
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(bar: StatusBar) -> String {
        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect()
    }

    #[test]
    fn test_ready_shows_send_hint() {
        let line = rendered(StatusBar::new(false, Focus::Prompt));
        assert!(line.contains("READY"));
        assert!(line.contains("Enter: send"));
    }

    #[test]
    fn test_loading_hides_submit_hints() {
        let line = rendered(StatusBar::new(true, Focus::Prompt).spinner("⠋"));
        assert!(line.contains("WAITING"));
        assert!(!line.contains("send"));
    }

    #[test]
    fn test_notice_replaces_hints() {
        let line = rendered(
            StatusBar::new(false, Focus::Code).with_notice(Some("chat failed".to_string())),
        );
        assert!(line.contains("chat failed"));
        assert!(!line.contains("Tab"));
    }
}

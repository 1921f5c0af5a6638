//! Message list widget
//!
//! System rows sit on the left, user rows on the right. Each row has a
//! `Name · HH:MM` header and a wrapped body no wider than 70% of the view.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget},
};
use unicode_width::UnicodeWidthStr;

use crate::chat::{Entry, Role};
use crate::tui::theme::Theme;

/// Gutter drawn beside each body line
const GUTTER: &str = "│";
/// Narrowest bubble, so short terminals still wrap sensibly
const MIN_BUBBLE_WIDTH: usize = 12;

/// State for the message list
#[derive(Debug)]
pub struct MessageListState {
    /// Current scroll offset (in lines)
    pub offset: usize,
    /// Total content height (in lines)
    pub content_height: usize,
    /// Viewport height
    pub viewport_height: usize,
    /// Keep the view pinned to the newest message
    pub follow: bool,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self {
            offset: 0,
            content_height: 0,
            viewport_height: 0,
            follow: true,
        }
    }
}

impl MessageListState {
    fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.offset = self.offset.saturating_sub(amount);
        self.follow = self.offset >= self.max_offset();
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.offset = (self.offset + amount).min(self.max_offset());
        self.follow = self.offset >= self.max_offset();
    }

    /// Content taller than the viewport
    pub fn has_overflow(&self) -> bool {
        self.content_height > self.viewport_height
    }

    /// Scrollbar position, one step per line of scroll
    pub fn scrollbar_state(&self) -> ScrollbarState {
        ScrollbarState::new(self.max_offset() + 1)
            .viewport_content_length(self.viewport_height)
            .position(self.offset)
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
        self.offset = self.max_offset();
    }

    /// Record the latest layout and settle the offset
    fn update(&mut self, content_height: usize, viewport_height: usize) {
        self.content_height = content_height;
        self.viewport_height = viewport_height;
        if self.follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }
}

/// Lay out every entry as styled lines for a view `width` columns wide
pub fn build_lines(entries: &[Entry], width: usize, spinner: &str) -> Vec<Line<'static>> {
    let bubble = (width * 7 / 10).max(MIN_BUBBLE_WIDTH).min(width);
    // Gutter plus one space of padding
    let text_width = bubble.saturating_sub(2).max(1);
    let mut lines = Vec::new();

    for entry in entries {
        let is_user = entry.is_user();
        let role_color = match entry.role() {
            Role::User => Theme::USER,
            Role::System => Theme::SYSTEM,
        };

        let mut block: Vec<Vec<Span<'static>>> = Vec::new();

        block.push(vec![
            Span::styled(
                entry.role().display_name(),
                Style::default().fg(role_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" · {}", entry.time_label()),
                Style::default().fg(Theme::MUTED),
            ),
        ]);

        let (body, body_style) = if entry.placeholder {
            (
                format!("{} {}", spinner, entry.content()),
                Style::default()
                    .fg(Theme::MUTED)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            (entry.content().to_string(), Style::default().fg(Theme::TEXT))
        };

        let gutter_style = Style::default().fg(role_color);
        for wrapped in textwrap::wrap(&body, text_width) {
            let text = Span::styled(wrapped.into_owned(), body_style);
            if is_user {
                block.push(vec![text, Span::raw(" "), Span::styled(GUTTER, gutter_style)]);
            } else {
                block.push(vec![Span::styled(GUTTER, gutter_style), Span::raw(" "), text]);
            }
        }

        if is_user {
            // Right-align the whole bubble against its widest line
            let block_width = block.iter().map(|spans| spans_width(spans)).max().unwrap_or(0);
            for mut spans in block {
                let pad = width.saturating_sub(block_width)
                    + block_width.saturating_sub(spans_width(&spans));
                spans.insert(0, Span::raw(" ".repeat(pad)));
                lines.push(Line::from(spans));
            }
        } else {
            lines.extend(block.into_iter().map(Line::from));
        }

        lines.push(Line::default());
    }

    lines
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| s.content.width()).sum()
}

/// Widget for rendering the message list
pub struct MessageList<'a> {
    entries: &'a [Entry],
    spinner: &'a str,
}

impl<'a> MessageList<'a> {
    pub fn new(entries: &'a [Entry]) -> Self {
        Self {
            entries,
            spinner: "",
        }
    }

    pub fn spinner(mut self, frame: &'a str) -> Self {
        self.spinner = frame;
        self
    }
}

impl StatefulWidget for MessageList<'_> {
    type State = MessageListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width < 2 || area.height == 0 {
            return;
        }

        // Last column is reserved for the scrollbar
        let text_width = (area.width - 1) as usize;
        let lines = build_lines(self.entries, text_width, self.spinner);
        state.update(lines.len(), area.height as usize);

        for (row, line) in lines
            .iter()
            .skip(state.offset)
            .take(area.height as usize)
            .enumerate()
        {
            buf.set_line(area.x, area.y + row as u16, line, area.width - 1);
        }

        if state.has_overflow() {
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .track_symbol(Some("│"))
                .thumb_symbol("█")
                .track_style(Style::default().fg(Theme::BORDER))
                .thumb_style(Style::default().fg(Theme::ACCENT))
                .render(area, buf, &mut state.scrollbar_state());
        }
    }
}

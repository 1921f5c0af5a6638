//! Main UI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::state::ChatView;
use super::theme::Theme;
use super::widgets::{Header, MessageList, StatusBar};

/// Rows given to the code editor, borders included
const CODE_EDITOR_HEIGHT: u16 = 7;

/// Render the entire UI
pub fn render(frame: &mut Frame, view: &mut ChatView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                  // Header
            Constraint::Min(3),                     // Messages
            Constraint::Length(CODE_EDITOR_HEIGHT), // Code editor
            Constraint::Length(3),                  // Prompt
            Constraint::Length(1),                  // Status
        ])
        .split(frame.area());

    let message_count = view
        .conversation
        .entries()
        .iter()
        .filter(|e| !e.placeholder)
        .count();
    frame.render_widget(Header::new(&view.backend_label, message_count), chunks[0]);

    let spinner = view.spinner_frame();
    frame.render_stateful_widget(
        MessageList::new(view.conversation.entries()).spinner(spinner),
        chunks[1],
        &mut view.message_list_state,
    );

    frame.render_widget(&view.code_input, chunks[2]);
    frame.render_widget(&view.prompt, chunks[3]);

    frame.render_widget(
        StatusBar::new(view.is_loading(), view.focus)
            .spinner(spinner)
            .with_notice(view.notice().map(str::to_string)),
        chunks[4],
    );

    if view.show_help {
        render_help(frame, frame.area());
    }
}

fn render_help(frame: &mut Frame, area: Rect) {
    let bindings = [
        ("Enter", "Send message"),
        ("F5", "Analyze code editor contents"),
        ("Ctrl+Enter", "Analyze (if the terminal reports it)"),
        ("Tab", "Switch between prompt and code editor"),
        ("Ctrl+V", "Paste"),
        ("PgUp/PgDn", "Scroll messages"),
        ("Ctrl+L", "Clear conversation"),
        ("Esc", "Close help / dismiss notice"),
        ("Ctrl+Q", "Quit"),
    ];

    let help_lines: Vec<Line> = bindings
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!(" {:<12}", key), Style::default().fg(Color::Cyan)),
                Span::raw(*what),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Theme::YELLOW))
        .title(" Help ");

    let paragraph = Paragraph::new(help_lines)
        .block(block)
        .alignment(Alignment::Left);

    let area = centered_rect(60, 50, area);
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

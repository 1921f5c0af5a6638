//! TUI color palette

use ratatui::style::Color;

/// Color constants shared by every widget
pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Rgb(30, 30, 30);
    pub const INPUT_BG: Color = Color::Rgb(37, 37, 38);
    pub const TEXT: Color = Color::Rgb(212, 212, 212);
    pub const MUTED: Color = Color::Rgb(128, 128, 128);
    pub const BORDER: Color = Color::Rgb(60, 60, 60);
    pub const ACCENT: Color = Color::Rgb(0, 122, 204);
    pub const GREEN: Color = Color::Rgb(72, 185, 100);
    pub const YELLOW: Color = Color::Rgb(255, 193, 7);
    pub const ERROR: Color = Color::Rgb(244, 67, 54);
    pub const USER: Color = Color::Rgb(59, 130, 246);
    pub const SYSTEM: Color = Color::Rgb(156, 220, 254);
}

pub mod question;
pub mod results;
pub mod setup;

use ratatui::style::{Color, Style};

pub(crate) fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

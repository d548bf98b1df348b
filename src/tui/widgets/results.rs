use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::score::ReviewEntry;
use crate::tui::App;
use crate::view::ResultsView;

pub fn draw(f: &mut Frame, app: &App, view: &ResultsView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Score
            Constraint::Min(0),    // Review
        ])
        .split(area);

    draw_score(f, view, chunks[0]);
    draw_review(f, app, view, chunks[1]);
}

fn draw_score(f: &mut Frame, view: &ResultsView, area: Rect) {
    let color = match view.percent {
        70..=100 => Color::Green,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    };

    let text = Line::from(vec![
        Span::styled(
            format!("{}, you scored ", view.candidate),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{} / {}", view.score, view.total),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({}%).", view.percent),
            Style::default().fg(Color::White),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Results (seed {}) ", view.seed));
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn entry_lines(entry: &ReviewEntry) -> Vec<Line<'_>> {
    let (mark, mark_color) = if entry.is_correct {
        ("✅", Color::Green)
    } else {
        ("❌", Color::Red)
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{}. ", entry.number),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                format!("[{}] ", entry.category),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                entry.prompt.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("   Your answer: ", Style::default().fg(Color::Gray)),
            Span::raw(entry.chosen_text.as_deref().unwrap_or("—")),
            Span::raw(" "),
            Span::styled(mark, Style::default().fg(mark_color)),
        ]),
    ];

    if !entry.is_correct {
        lines.push(Line::from(vec![
            Span::styled("   Correct: ", Style::default().fg(Color::Gray)),
            Span::styled(
                entry.correct_text.as_str(),
                Style::default().fg(Color::Green),
            ),
        ]));
    }

    if let Some(explanation) = &entry.explanation {
        lines.push(Line::from(Span::styled(
            format!("   {}", explanation),
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines.push(Line::from(""));
    lines
}

/// Unwrapped line count of the review list; bounds the scroll offset.
pub fn review_line_count(review: &[ReviewEntry]) -> usize {
    review.iter().map(|entry| entry_lines(entry).len()).sum()
}

fn draw_review(f: &mut Frame, app: &App, view: &ResultsView, area: Rect) {
    let lines: Vec<Line> = view.review.iter().flat_map(entry_lines).collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Review answers ({}) ", view.review.len()))
        .title_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.review_scroll, 0));
    f.render_widget(paragraph, area);
}

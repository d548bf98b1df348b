use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::focus_style;
use crate::bank::ALL_LABEL;
use crate::tui::{App, SetupField};
use crate::view::SetupView;

pub fn draw(f: &mut Frame, app: &App, view: &SetupView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Min(5),    // Category pills
            Constraint::Length(3), // Count
            Constraint::Length(3), // Pool summary
        ])
        .split(area);

    draw_name(f, app, view, chunks[0]);
    draw_categories(f, app, view, chunks[1]);
    draw_count(f, app, chunks[2]);
    draw_summary(f, app, view, chunks[3]);
}

fn draw_name(f: &mut Frame, app: &App, view: &SetupView, area: Rect) {
    let focused = app.focus == SetupField::Name;

    let mut spans = if view.name.is_empty() && !focused {
        vec![Span::styled(
            "e.g., Test Candidate",
            Style::default().fg(Color::DarkGray),
        )]
    } else {
        vec![Span::styled(view.name.as_str(), Style::default().fg(Color::White))]
    };
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title(" Your name ");

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn pill(label: &str, active: bool) -> Span<'static> {
    let style = if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(format!(" {} ", label), style)
}

fn draw_categories(f: &mut Frame, app: &App, view: &SetupView, area: Rect) {
    let focused = app.focus == SetupField::Category;

    let mut spans = Vec::with_capacity(view.categories.len() * 2);
    for label in &view.categories {
        spans.push(pill(label, *label == view.category));
        spans.push(Span::raw(" "));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title(" Select category (optional) ");

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_count(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == SetupField::Count;

    let mut spans = Vec::with_capacity(app.count_options.len() * 2);
    for (i, count) in app.count_options.iter().enumerate() {
        spans.push(pill(&count.label(), i == app.count_cursor));
        spans.push(Span::raw(" "));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title(" Questions per session ");

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_summary(f: &mut Frame, app: &App, view: &SetupView, area: Rect) {
    let bank = app.quiz.bank();
    let pool = if view.category == ALL_LABEL {
        bank.len()
    } else {
        bank.count_in(&view.category)
    };
    let count = app.quiz.config().count.effective(pool);

    let text = Line::from(vec![
        Span::styled(
            format!("{} ", count),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("of {} questions in '{}'", pool, view.category),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let block = Block::default().borders(Borders::ALL).title(" Session ");
    f.render_widget(Paragraph::new(text).block(block), area);
}

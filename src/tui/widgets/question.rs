use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::models::option_letter;
use crate::view::QuestionView;

pub fn draw(f: &mut Frame, view: &QuestionView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Candidate + position
            Constraint::Length(1), // Progress
            Constraint::Min(6),    // Prompt + options
            Constraint::Length(5), // Explanation
        ])
        .split(area);

    draw_header(f, view, chunks[0]);
    draw_progress(f, view, chunks[1]);
    draw_prompt(f, view, chunks[2]);
    draw_explanation(f, view, chunks[3]);
}

fn draw_header(f: &mut Frame, view: &QuestionView, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let candidate = Paragraph::new(Line::from(vec![
        Span::styled(" Candidate: ", Style::default().fg(Color::Gray)),
        Span::styled(
            view.candidate.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    let position = Paragraph::new(Span::styled(
        format!("Question {} / {} ", view.number, view.total),
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Right);

    f.render_widget(candidate, halves[0]);
    f.render_widget(position, halves[1]);
}

fn draw_progress(f: &mut Frame, view: &QuestionView, area: Rect) {
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Gray).bg(Color::Black))
        .percent(u16::from(view.progress_percent.min(100)))
        .label(format!("{}%", view.progress_percent));
    f.render_widget(gauge, area);
}

fn option_style(view: &QuestionView, index: usize) -> Style {
    let Some(selected) = view.selected else {
        return Style::default().fg(Color::White);
    };
    if view.correct_index == Some(index) {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else if selected == index {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_prompt(f: &mut Frame, view: &QuestionView, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            view.prompt.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (i, option) in view.options.iter().enumerate() {
        let style = option_style(view, i);
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {}. ", option_letter(i)),
                style.add_modifier(Modifier::BOLD),
            ),
            Span::styled(option.as_str(), style),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", view.category))
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_explanation(f: &mut Frame, view: &QuestionView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Explanation ");

    let Some(correct) = view.is_correct else {
        let hint = Paragraph::new("Pick an answer to see the explanation.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(hint, area);
        return;
    };

    let verdict = if correct {
        Span::styled("Correct. ", Style::default().fg(Color::Green))
    } else {
        Span::styled("Incorrect. ", Style::default().fg(Color::Red))
    };
    let text = Line::from(vec![
        verdict,
        Span::raw(view.explanation.as_deref().unwrap_or("—")),
    ]);

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::widgets::{question, results, setup};
use super::App;
use crate::view::QuizView;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Message
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    let view = app.quiz.view();

    draw_title(f, &view, chunks[0]);
    match &view {
        QuizView::Setup(v) => setup::draw(f, app, v, chunks[1]),
        QuizView::Question(v) => question::draw(f, v, chunks[1]),
        QuizView::Results(v) => results::draw(f, app, v, chunks[1]),
    }
    draw_message(f, app, chunks[2]);
    draw_help_bar(f, &view, chunks[3]);
}

fn draw_title(f: &mut Frame, view: &QuizView, area: Rect) {
    let stage = match view {
        QuizView::Setup(_) => "Setup",
        QuizView::Question(_) => "In progress",
        QuizView::Results(_) => "Results",
    };

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "English Teaching Exam MCQ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(stage, Style::default().fg(Color::Gray)),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" exam-mcq "));

    f.render_widget(title, area);
}

fn draw_message(f: &mut Frame, app: &App, area: Rect) {
    if let Some(message) = &app.message {
        let line = Paragraph::new(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        ));
        f.render_widget(line, area);
    }
}

fn key(label: &str) -> Span<'_> {
    Span::styled(label, Style::default().fg(Color::Cyan))
}

fn draw_help_bar(f: &mut Frame, view: &QuizView, area: Rect) {
    let mut spans = match view {
        QuizView::Setup(_) => vec![
            key("Tab"),
            Span::raw(" Field  "),
            key("h/l"),
            Span::raw(" Change  "),
            key("<CR>"),
            Span::raw(" Begin test  "),
            key("<Esc>"),
            Span::raw(" Quit"),
        ],
        QuizView::Question(q) => {
            let next = if q.is_last { " Finish  " } else { " Next  " };
            vec![
                key("a-z/1-9"),
                Span::raw(" Answer  "),
                key("<CR>"),
                Span::raw(next),
                key("r"),
                Span::raw(" Restart  "),
                key("q"),
                Span::raw(" Quit"),
            ]
        }
        QuizView::Results(_) => vec![
            key("j/k"),
            Span::raw(" Scroll  "),
            key("e"),
            Span::raw(" Export  "),
            key("r"),
            Span::raw(" Start over  "),
            key("q"),
            Span::raw(" Quit"),
        ],
    };
    spans.insert(0, Span::raw(" "));

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(help, area);
}

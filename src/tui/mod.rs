mod ui;
mod widgets;

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use crate::models::option_index;
use crate::quiz::{Quiz, QuizConfig, QuizState};
use crate::session::{CategoryFilter, QuestionCount, COUNT_CHOICES};
use crate::store::NameStore;
use crate::view::{QuizView, ResultsView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Name,
    Category,
    Count,
}

impl SetupField {
    fn next(&self) -> Self {
        match self {
            SetupField::Name => SetupField::Category,
            SetupField::Category => SetupField::Count,
            SetupField::Count => SetupField::Name,
        }
    }

    fn prev(&self) -> Self {
        match self {
            SetupField::Name => SetupField::Count,
            SetupField::Category => SetupField::Name,
            SetupField::Count => SetupField::Category,
        }
    }
}

pub struct App {
    pub quiz: Quiz,
    store: Box<dyn NameStore>,
    pub focus: SetupField,
    pub category_labels: Vec<String>,
    pub category_cursor: usize,
    pub count_options: Vec<QuestionCount>,
    pub count_cursor: usize,
    pub message: Option<String>,
    pub review_scroll: u16,
    pending_seed: Option<u64>,
    export_dir: PathBuf,
    pub should_quit: bool,
}

impl App {
    pub fn new(quiz: Quiz, store: Box<dyn NameStore>, seed: Option<u64>, export_dir: PathBuf) -> Self {
        let config = quiz.config().clone();

        let category_labels: Vec<String> = quiz
            .bank()
            .filter_labels()
            .into_iter()
            .map(str::to_string)
            .collect();
        let category_cursor = category_labels
            .iter()
            .position(|l| l == config.filter.label())
            .unwrap_or(0);

        let mut count_options = COUNT_CHOICES.to_vec();
        if !count_options.contains(&config.count) {
            count_options.insert(0, config.count);
        }
        let count_cursor = count_options
            .iter()
            .position(|c| *c == config.count)
            .unwrap_or(0);

        let focus = if config.name.trim().is_empty() {
            SetupField::Name
        } else {
            SetupField::Category
        };

        Self {
            quiz,
            store,
            focus,
            category_labels,
            category_cursor,
            count_options,
            count_cursor,
            message: None,
            review_scroll: 0,
            pending_seed: seed,
            export_dir,
            should_quit: false,
        }
    }

    fn update_config(&mut self, edit: impl FnOnce(&mut QuizConfig)) {
        let mut config = self.quiz.config().clone();
        edit(&mut config);
        if let Err(e) = self.quiz.configure(config) {
            self.message = Some(e.to_string());
        }
    }

    fn edit_name(&mut self, edit: impl FnOnce(&mut String)) {
        self.update_config(|c| edit(&mut c.name));
        self.store.save_display_name(&self.quiz.config().name);
    }

    fn cycle_category(&mut self, forward: bool) {
        let len = self.category_labels.len();
        if len == 0 {
            return;
        }
        self.category_cursor = cycle(self.category_cursor, len, forward);
        // Slot 0 is the "All" pill; every other label is a bank category verbatim.
        let filter = if self.category_cursor == 0 {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(self.category_labels[self.category_cursor].clone())
        };
        self.update_config(|c| c.filter = filter);
    }

    fn cycle_count(&mut self, forward: bool) {
        let len = self.count_options.len();
        if len == 0 {
            return;
        }
        self.count_cursor = cycle(self.count_cursor, len, forward);
        let count = self.count_options[self.count_cursor];
        self.update_config(|c| c.count = count);
    }

    fn start(&mut self) {
        let result = match self.pending_seed.take() {
            Some(seed) => {
                let result = self.quiz.start_with_seed(seed);
                if result.is_err() {
                    self.pending_seed = Some(seed);
                }
                result
            }
            None => self.quiz.start(),
        };

        match result {
            Ok(()) => {
                self.message = None;
                self.review_scroll = 0;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn restart(&mut self) {
        match self.quiz.restart() {
            Ok(()) => self.message = None,
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn export_review(&mut self) {
        let QuizView::Results(results) = self.quiz.view() else {
            return;
        };
        match write_review(&results, &self.export_dir) {
            Ok(path) => {
                info!(path = %path.display(), "review exported");
                self.message = Some(format!("Saved review to {}", path.display()));
            }
            Err(e) => {
                warn!(error = %e, "review export failed");
                self.message = Some(format!("Export failed: {}", e));
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if matches!(self.quiz.state(), QuizState::Unconfigured) {
            self.handle_setup_key(key.code);
        } else if matches!(self.quiz.state(), QuizState::InProgress(_)) {
            self.handle_question_key(key.code);
        } else {
            self.handle_results_key(key.code);
        }
    }

    fn handle_setup_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.start(),
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),

            KeyCode::Backspace if self.focus == SetupField::Name => {
                self.edit_name(|name| {
                    name.pop();
                });
            }
            KeyCode::Char(c) if self.focus == SetupField::Name => {
                self.edit_name(|name| name.push(c));
            }

            KeyCode::Left | KeyCode::Char('h') => match self.focus {
                SetupField::Category => self.cycle_category(false),
                SetupField::Count => self.cycle_count(false),
                SetupField::Name => {}
            },
            KeyCode::Right | KeyCode::Char('l') => match self.focus {
                SetupField::Category => self.cycle_category(true),
                SetupField::Count => self.cycle_count(true),
                SetupField::Name => {}
            },

            _ => {}
        }
    }

    fn handle_question_key(&mut self, key: KeyCode) {
        let option_count = self
            .quiz
            .current_question()
            .map(|q| q.options.len())
            .unwrap_or(0);

        match key {
            KeyCode::Char(c) if key_option(c).is_some_and(|i| i < option_count) => {
                if let Some(index) = key_option(c) {
                    match self.quiz.choose(index) {
                        Ok(_) => self.message = None,
                        Err(e) => self.message = Some(e.to_string()),
                    }
                }
            }
            KeyCode::Enter | KeyCode::Right => match self.quiz.advance() {
                Ok(_) => {
                    self.message = None;
                    self.review_scroll = 0;
                }
                Err(e) => self.message = Some(e.to_string()),
            },
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('j') | KeyCode::Down => {
                let max = self
                    .quiz
                    .review()
                    .map(|review| widgets::results::review_line_count(&review))
                    .unwrap_or(0)
                    .saturating_sub(1);
                let max = u16::try_from(max).unwrap_or(u16::MAX);
                self.review_scroll = self.review_scroll.saturating_add(1).min(max);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.review_scroll = self.review_scroll.saturating_sub(1);
            }
            KeyCode::Char('g') => self.review_scroll = 0,
            KeyCode::Char('e') => self.export_review(),
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }
}

fn cycle(current: usize, len: usize, forward: bool) -> usize {
    if forward {
        (current + 1) % len
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

// Letters pick options A, B, ...; digits 1-9 pick the nth option.
fn key_option(c: char) -> Option<usize> {
    match c {
        '1'..='9' => c.to_digit(10).map(|d| d as usize - 1),
        _ => option_index(c),
    }
}

/// Writes the finished attempt's review as pretty JSON into `dir`. Never
/// overwrites an earlier export.
pub fn write_review(results: &ResultsView, dir: &Path) -> io::Result<PathBuf> {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S%3f");
    let json = serde_json::to_string_pretty(results)?;

    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            format!("exam-mcq-review-{}.json", stamp)
        } else {
            format!("exam-mcq-review-{}-{}.json", stamp, suffix)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(json.as_bytes())?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e),
        }
    }
}

pub fn run(
    quiz: Quiz,
    store: Box<dyn NameStore>,
    seed: Option<u64>,
    export_dir: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(quiz, store, seed, export_dir);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

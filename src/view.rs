//! Read-only snapshots of what each screen needs to draw.

use serde::Serialize;

use crate::quiz::{Quiz, QuizState};
use crate::score::{self, ReviewEntry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum QuizView {
    Setup(SetupView),
    Question(QuestionView),
    Results(ResultsView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupView {
    pub categories: Vec<String>,
    pub name: String,
    pub category: String,
    pub count: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub candidate: String,
    pub number: usize,
    pub total: usize,
    pub progress_percent: u8,
    pub question_id: String,
    pub category: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    /// Revealed only once an option has been selected.
    pub correct_index: Option<usize>,
    pub is_correct: Option<bool>,
    pub explanation: Option<String>,
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsView {
    pub candidate: String,
    /// Replays the same ordering with `session --seed`.
    pub seed: u64,
    pub score: usize,
    pub total: usize,
    pub percent: u8,
    pub review: Vec<ReviewEntry>,
}

impl Quiz {
    pub fn view(&self) -> QuizView {
        let candidate = self.config().name.trim().to_string();

        match self.state() {
            QuizState::Unconfigured => QuizView::Setup(SetupView {
                categories: self
                    .bank()
                    .filter_labels()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                name: self.config().name.clone(),
                category: self.config().filter.label().to_string(),
                count: self.config().count.label(),
            }),

            QuizState::InProgress(attempt) => {
                // An in-progress attempt always points at a question.
                let question = &attempt.questions()[attempt.current_index()];
                let selected = attempt.selected();
                let revealed = selected.is_some();

                QuizView::Question(QuestionView {
                    candidate,
                    number: attempt.current_index() + 1,
                    total: self.total(),
                    progress_percent: self.progress_percent(),
                    question_id: question.id.clone(),
                    category: question.category.clone(),
                    prompt: question.prompt.clone(),
                    options: question.options.clone(),
                    selected,
                    correct_index: revealed.then_some(question.correct_index),
                    is_correct: selected.map(|s| question.is_correct(s)),
                    explanation: if revealed {
                        question.explanation.clone()
                    } else {
                        None
                    },
                    is_last: attempt.is_last(),
                })
            }

            QuizState::Finished(attempt) => {
                let score = self.current_score();
                QuizView::Results(ResultsView {
                    candidate,
                    seed: attempt.seed(),
                    score,
                    total: self.total(),
                    percent: score::percent(score, self.total()),
                    review: self.review().unwrap_or_default(),
                })
            }
        }
    }
}

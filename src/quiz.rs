//! The attempt lifecycle: `Unconfigured` -> `InProgress` -> `Finished`.
//!
//! Every rejected transition returns an error and leaves the quiz exactly as
//! it was, so the caller can fix its input and retry.

use thiserror::Error;
use tracing::{debug, info};

use crate::bank::QuestionBank;
use crate::models::{Answer, Question};
use crate::score::{self, ReviewEntry};
use crate::session::{build_session, CategoryFilter, QuestionCount, SessionError};
use crate::shuffle::draw_seed;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("enter your name before starting")]
    EmptyName,

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("question count must be a positive number or 'all', got '{0}'")]
    InvalidCount(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no questions available for '{0}'")]
    EmptyPool(String),

    #[error("cannot {action} while the quiz is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("option {index} does not exist on question '{question_id}' ({count} options)")]
    OptionOutOfRange {
        question_id: String,
        index: usize,
        count: usize,
    },

    #[error("answer question '{0}' before moving on")]
    Unanswered(String),
}

impl From<SessionError> for QuizError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidCount(raw) => ValidationError::InvalidCount(raw).into(),
            SessionError::EmptyPool(filter) => QuizError::EmptyPool(filter),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizConfig {
    pub name: String,
    pub filter: CategoryFilter,
    pub count: QuestionCount,
}

/// State scoped to one run through the ordered questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    seed: u64,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    current: usize,
    selected: Option<usize>,
}

impl Attempt {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QuizState {
    #[default]
    Unconfigured,
    InProgress(Attempt),
    Finished(Attempt),
}

impl QuizState {
    pub fn name(&self) -> &'static str {
        match self {
            QuizState::Unconfigured => "unconfigured",
            QuizState::InProgress(_) => "in progress",
            QuizState::Finished(_) => "finished",
        }
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        match self {
            QuizState::Unconfigured => None,
            QuizState::InProgress(attempt) | QuizState::Finished(attempt) => Some(attempt),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceOutcome {
    Recorded { correct: bool },
    AlreadyAnswered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    Finished,
}

pub struct Quiz {
    bank: QuestionBank,
    config: QuizConfig,
    state: QuizState,
}

impl Quiz {
    pub fn new(bank: QuestionBank) -> Self {
        Self::with_config(bank, QuizConfig::default())
    }

    pub fn with_config(bank: QuestionBank, config: QuizConfig) -> Self {
        Self {
            bank,
            config,
            state: QuizState::Unconfigured,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    fn reject(&self, action: &'static str) -> QuizError {
        debug!(action, state = self.state.name(), "rejected transition");
        QuizError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    /// Replaces the setup. Values are checked on [`Quiz::start`].
    pub fn configure(&mut self, config: QuizConfig) -> Result<(), QuizError> {
        if !matches!(self.state, QuizState::Unconfigured) {
            return Err(self.reject("configure"));
        }
        self.config = config;
        Ok(())
    }

    /// Starts an attempt with a freshly drawn seed.
    pub fn start(&mut self) -> Result<(), QuizError> {
        self.start_with_seed(draw_seed())
    }

    pub fn start_with_seed(&mut self, seed: u64) -> Result<(), QuizError> {
        if !matches!(self.state, QuizState::Unconfigured) {
            return Err(self.reject("start"));
        }
        if self.config.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if let CategoryFilter::Only(category) = &self.config.filter {
            if !self.bank.has_category(category) {
                return Err(ValidationError::UnknownCategory(category.clone()).into());
            }
        }

        let questions = build_session(&self.bank, &self.config.filter, seed, self.config.count)?;

        info!(
            candidate = %self.config.name.trim(),
            filter = %self.config.filter,
            seed,
            questions = questions.len(),
            "attempt started"
        );

        self.state = QuizState::InProgress(Attempt {
            seed,
            questions,
            answers: Vec::new(),
            current: 0,
            selected: None,
        });
        Ok(())
    }

    /// Records the answer for the current question. Only the first choice
    /// per question counts; later calls report `AlreadyAnswered`.
    pub fn choose(&mut self, option: usize) -> Result<ChoiceOutcome, QuizError> {
        let QuizState::InProgress(attempt) = &mut self.state else {
            return Err(self.reject("choose"));
        };
        let Some(question) = attempt.questions.get(attempt.current) else {
            return Err(QuizError::InvalidTransition {
                action: "choose",
                state: "in progress",
            });
        };

        if attempt.selected.is_some() {
            return Ok(ChoiceOutcome::AlreadyAnswered);
        }
        if option >= question.options.len() {
            return Err(QuizError::OptionOutOfRange {
                question_id: question.id.clone(),
                index: option,
                count: question.options.len(),
            });
        }

        let correct = question.is_correct(option);
        let question_id = question.id.clone();
        debug!(question = %question_id, option, correct, "answer recorded");

        attempt.selected = Some(option);
        attempt.answers.push(Answer::new(question_id, option));
        Ok(ChoiceOutcome::Recorded { correct })
    }

    /// Moves to the next question, or finishes after the last one.
    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        let QuizState::InProgress(attempt) = &mut self.state else {
            return Err(self.reject("advance"));
        };

        if attempt.selected.is_none() {
            let id = attempt
                .current_question()
                .map(|q| q.id.clone())
                .unwrap_or_default();
            return Err(QuizError::Unanswered(id));
        }

        if attempt.current + 1 < attempt.questions.len() {
            attempt.current += 1;
            attempt.selected = None;
            return Ok(Advance::Next);
        }

        let state = std::mem::take(&mut self.state);
        if let QuizState::InProgress(attempt) = state {
            info!(
                score = score::score(&attempt.questions, &attempt.answers),
                total = attempt.questions.len(),
                "attempt finished"
            );
            self.state = QuizState::Finished(attempt);
        }
        Ok(Advance::Finished)
    }

    /// Drops the attempt and returns to setup. The configuration is kept.
    pub fn restart(&mut self) -> Result<(), QuizError> {
        if matches!(self.state, QuizState::Unconfigured) {
            return Err(self.reject("restart"));
        }
        debug!(from = self.state.name(), "attempt discarded");
        self.state = QuizState::Unconfigured;
        Ok(())
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        self.state.attempt()
    }

    pub fn current_question(&self) -> Option<&Question> {
        match &self.state {
            QuizState::InProgress(attempt) => attempt.current_question(),
            _ => None,
        }
    }

    pub fn answers(&self) -> &[Answer] {
        self.attempt().map(Attempt::answers).unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.attempt().map(Attempt::total).unwrap_or(0)
    }

    /// Share of the attempt already behind the candidate. A finished attempt
    /// is always 100.
    pub fn progress_percent(&self) -> u8 {
        match &self.state {
            QuizState::Unconfigured => 0,
            QuizState::InProgress(attempt) => score::percent(attempt.current, attempt.total()),
            QuizState::Finished(attempt) => score::percent(attempt.total(), attempt.total()),
        }
    }

    pub fn current_score(&self) -> usize {
        self.attempt()
            .map(|a| score::score(&a.questions, self.answers()))
            .unwrap_or(0)
    }

    /// Per-question review, available once the attempt is finished.
    pub fn review(&self) -> Option<Vec<ReviewEntry>> {
        match &self.state {
            QuizState::Finished(attempt) => {
                Some(score::review(&attempt.questions, &attempt.answers))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::make_question;

    pub(crate) fn three_question_bank() -> QuestionBank {
        QuestionBank::new(vec![
            make_question("G-1", "Grammar", 0),
            make_question("G-2", "Grammar", 1),
            make_question("V-1", "Vocabulary", 2),
        ])
        .unwrap()
    }

    fn config(name: &str, filter: CategoryFilter, count: QuestionCount) -> QuizConfig {
        QuizConfig {
            name: name.to_string(),
            filter,
            count,
        }
    }

    pub(crate) fn started_quiz(count: QuestionCount) -> Quiz {
        let mut quiz = Quiz::with_config(
            three_question_bank(),
            config("Test Candidate", CategoryFilter::All, count),
        );
        quiz.start_with_seed(42).unwrap();
        quiz
    }

    fn correct_of_current(quiz: &Quiz) -> usize {
        quiz.current_question().unwrap().correct_index
    }

    fn wrong_of_current(quiz: &Quiz) -> usize {
        (correct_of_current(quiz) + 1) % 3
    }

    mod configure_tests {
        use super::*;

        #[test]
        fn new_quiz_is_unconfigured() {
            let quiz = Quiz::new(three_question_bank());
            assert_eq!(quiz.state(), &QuizState::Unconfigured);
            assert_eq!(quiz.config(), &QuizConfig::default());
        }

        #[test]
        fn configure_stores_values() {
            let mut quiz = Quiz::new(three_question_bank());
            let cfg = config(
                "Ana",
                CategoryFilter::Only("Grammar".to_string()),
                QuestionCount::Limit(1),
            );
            quiz.configure(cfg.clone()).unwrap();
            assert_eq!(quiz.config(), &cfg);
            assert_eq!(quiz.state(), &QuizState::Unconfigured);
        }

        #[test]
        fn configure_rejected_during_attempt() {
            let mut quiz = started_quiz(QuestionCount::All);
            let before = quiz.config().clone();
            let err = quiz.configure(QuizConfig::default()).unwrap_err();
            assert!(matches!(err, QuizError::InvalidTransition { action: "configure", .. }));
            assert_eq!(quiz.config(), &before);
        }
    }

    mod start_tests {
        use super::*;

        #[test]
        fn empty_name_rejected() {
            let mut quiz = Quiz::with_config(
                three_question_bank(),
                config("   ", CategoryFilter::All, QuestionCount::All),
            );
            let err = quiz.start_with_seed(1).unwrap_err();
            assert_eq!(err, QuizError::Validation(ValidationError::EmptyName));
            assert_eq!(quiz.state(), &QuizState::Unconfigured);
        }

        #[test]
        fn unknown_category_rejected() {
            let mut quiz = Quiz::with_config(
                three_question_bank(),
                config("Ana", CategoryFilter::Only("ICT".to_string()), QuestionCount::All),
            );
            let err = quiz.start_with_seed(1).unwrap_err();
            assert_eq!(
                err,
                QuizError::Validation(ValidationError::UnknownCategory("ICT".to_string()))
            );
            assert_eq!(quiz.state(), &QuizState::Unconfigured);
        }

        #[test]
        fn zero_count_rejected() {
            let mut quiz = Quiz::with_config(
                three_question_bank(),
                config("Ana", CategoryFilter::All, QuestionCount::Limit(0)),
            );
            let err = quiz.start_with_seed(1).unwrap_err();
            assert_eq!(
                err,
                QuizError::Validation(ValidationError::InvalidCount("0".to_string()))
            );
        }

        #[test]
        fn start_builds_attempt() {
            let quiz = started_quiz(QuestionCount::Limit(2));
            let attempt = quiz.attempt().unwrap();
            assert!(matches!(quiz.state(), QuizState::InProgress(_)));
            assert_eq!(attempt.seed(), 42);
            assert_eq!(attempt.total(), 2);
            assert_eq!(attempt.current_index(), 0);
            assert!(attempt.selected().is_none());
            assert!(attempt.answers().is_empty());
        }

        #[test]
        fn start_is_deterministic_per_seed() {
            let a = started_quiz(QuestionCount::All);
            let b = started_quiz(QuestionCount::All);
            assert_eq!(a.attempt().unwrap().questions(), b.attempt().unwrap().questions());
        }

        #[test]
        fn start_twice_rejected() {
            let mut quiz = started_quiz(QuestionCount::All);
            let before = quiz.state().clone();
            assert!(quiz.start().is_err());
            assert_eq!(quiz.state(), &before);
        }

        #[test]
        fn start_draws_seed() {
            let mut quiz = Quiz::with_config(
                three_question_bank(),
                config("Ana", CategoryFilter::All, QuestionCount::All),
            );
            quiz.start().unwrap();
            assert_eq!(quiz.total(), 3);
        }

        #[test]
        fn restart_then_start_draws_a_new_seed() {
            let mut quiz = Quiz::with_config(
                three_question_bank(),
                config("Ana", CategoryFilter::All, QuestionCount::All),
            );
            let mut seeds = Vec::new();
            for _ in 0..4 {
                quiz.start().unwrap();
                seeds.push(quiz.attempt().unwrap().seed());
                quiz.restart().unwrap();
            }
            seeds.sort_unstable();
            seeds.dedup();
            assert_eq!(seeds.len(), 4, "seeds repeated: {:?}", seeds);
        }
    }

    mod choose_tests {
        use super::*;

        #[test]
        fn choose_records_answer() {
            let mut quiz = started_quiz(QuestionCount::All);
            let correct = correct_of_current(&quiz);
            let id = quiz.current_question().unwrap().id.clone();

            let outcome = quiz.choose(correct).unwrap();

            assert_eq!(outcome, ChoiceOutcome::Recorded { correct: true });
            assert_eq!(quiz.answers(), &[Answer::new(id, correct)]);
            assert_eq!(quiz.attempt().unwrap().selected(), Some(correct));
        }

        #[test]
        fn wrong_choice_reported() {
            let mut quiz = started_quiz(QuestionCount::All);
            let wrong = wrong_of_current(&quiz);
            assert_eq!(
                quiz.choose(wrong).unwrap(),
                ChoiceOutcome::Recorded { correct: false }
            );
        }

        #[test]
        fn second_choice_is_noop() {
            let mut quiz = started_quiz(QuestionCount::All);
            let first = wrong_of_current(&quiz);
            let id = quiz.current_question().unwrap().id.clone();

            quiz.choose(first).unwrap();
            assert_eq!(quiz.choose(correct_of_current(&quiz)).unwrap(), ChoiceOutcome::AlreadyAnswered);
            assert_eq!(quiz.choose(first).unwrap(), ChoiceOutcome::AlreadyAnswered);

            assert_eq!(quiz.answers(), &[Answer::new(id, first)]);
            assert_eq!(quiz.attempt().unwrap().selected(), Some(first));
        }

        #[test]
        fn out_of_range_rejected_without_change() {
            let mut quiz = started_quiz(QuestionCount::All);
            let err = quiz.choose(3).unwrap_err();
            assert!(matches!(err, QuizError::OptionOutOfRange { index: 3, count: 3, .. }));
            assert!(quiz.answers().is_empty());
            assert!(quiz.attempt().unwrap().selected().is_none());
        }

        #[test]
        fn choose_before_start_rejected() {
            let mut quiz = Quiz::new(three_question_bank());
            assert!(matches!(
                quiz.choose(0),
                Err(QuizError::InvalidTransition { action: "choose", state: "unconfigured" })
            ));
        }
    }

    mod advance_tests {
        use super::*;

        #[test]
        fn advance_moves_and_clears_selection() {
            let mut quiz = started_quiz(QuestionCount::All);
            quiz.choose(0).unwrap();
            assert_eq!(quiz.advance().unwrap(), Advance::Next);

            let attempt = quiz.attempt().unwrap();
            assert_eq!(attempt.current_index(), 1);
            assert!(attempt.selected().is_none());
            assert_eq!(attempt.answers().len(), 1);
        }

        #[test]
        fn advance_without_answer_rejected() {
            let mut quiz = started_quiz(QuestionCount::All);
            let id = quiz.current_question().unwrap().id.clone();
            assert_eq!(quiz.advance().unwrap_err(), QuizError::Unanswered(id));
            assert_eq!(quiz.attempt().unwrap().current_index(), 0);
        }

        #[test]
        fn advance_past_last_finishes() {
            let mut quiz = started_quiz(QuestionCount::Limit(2));
            quiz.choose(0).unwrap();
            quiz.advance().unwrap();
            quiz.choose(0).unwrap();
            assert_eq!(quiz.advance().unwrap(), Advance::Finished);
            assert!(matches!(quiz.state(), QuizState::Finished(_)));
        }

        #[test]
        fn finished_rejects_choose_and_advance() {
            let mut quiz = started_quiz(QuestionCount::Limit(1));
            quiz.choose(0).unwrap();
            quiz.advance().unwrap();
            let before = quiz.state().clone();

            assert!(matches!(
                quiz.choose(1),
                Err(QuizError::InvalidTransition { state: "finished", .. })
            ));
            assert!(matches!(
                quiz.advance(),
                Err(QuizError::InvalidTransition { state: "finished", .. })
            ));
            assert_eq!(quiz.state(), &before);
        }

        #[test]
        fn answers_follow_session_order() {
            let mut quiz = started_quiz(QuestionCount::All);
            let order: Vec<String> = quiz
                .attempt()
                .unwrap()
                .questions()
                .iter()
                .map(|q| q.id.clone())
                .collect();
            for _ in 0..3 {
                quiz.choose(1).unwrap();
                quiz.advance().unwrap();
            }
            let answered: Vec<String> =
                quiz.answers().iter().map(|a| a.question_id.clone()).collect();
            assert_eq!(answered, order);
        }
    }

    mod restart_tests {
        use super::*;

        #[test]
        fn restart_clears_attempt_keeps_config() {
            let mut quiz = Quiz::with_config(
                three_question_bank(),
                config(
                    "Ana",
                    CategoryFilter::Only("Grammar".to_string()),
                    QuestionCount::Limit(1),
                ),
            );
            quiz.start_with_seed(3).unwrap();
            quiz.choose(0).unwrap();

            quiz.restart().unwrap();

            assert_eq!(quiz.state(), &QuizState::Unconfigured);
            assert!(quiz.answers().is_empty());
            assert_eq!(quiz.progress_percent(), 0);
            assert_eq!(quiz.config().name, "Ana");
            assert_eq!(quiz.config().filter, CategoryFilter::Only("Grammar".to_string()));
            assert_eq!(quiz.config().count, QuestionCount::Limit(1));
        }

        #[test]
        fn restart_from_finished() {
            let mut quiz = started_quiz(QuestionCount::Limit(1));
            quiz.choose(0).unwrap();
            quiz.advance().unwrap();
            quiz.restart().unwrap();
            assert_eq!(quiz.state(), &QuizState::Unconfigured);
        }

        #[test]
        fn restart_when_unconfigured_rejected() {
            let mut quiz = Quiz::new(three_question_bank());
            assert!(quiz.restart().is_err());
        }

        #[test]
        fn new_attempt_after_restart_starts_fresh() {
            let mut quiz = started_quiz(QuestionCount::All);
            quiz.choose(0).unwrap();
            quiz.advance().unwrap();
            quiz.restart().unwrap();

            quiz.start_with_seed(7).unwrap();
            let attempt = quiz.attempt().unwrap();
            assert_eq!(attempt.seed(), 7);
            assert_eq!(attempt.current_index(), 0);
            assert!(attempt.answers().is_empty());
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn progress_tracks_index() {
            let mut quiz = started_quiz(QuestionCount::All);
            assert_eq!(quiz.progress_percent(), 0);
            quiz.choose(0).unwrap();
            quiz.advance().unwrap();
            assert_eq!(quiz.progress_percent(), 33);
            quiz.choose(0).unwrap();
            quiz.advance().unwrap();
            assert_eq!(quiz.progress_percent(), 67);
        }

        #[test]
        fn unconfigured_queries_are_empty() {
            let quiz = Quiz::new(three_question_bank());
            assert_eq!(quiz.progress_percent(), 0);
            assert_eq!(quiz.current_score(), 0);
            assert_eq!(quiz.total(), 0);
            assert!(quiz.current_question().is_none());
            assert!(quiz.review().is_none());
        }

        #[test]
        fn review_only_when_finished() {
            let mut quiz = started_quiz(QuestionCount::Limit(1));
            assert!(quiz.review().is_none());
            quiz.choose(0).unwrap();
            quiz.advance().unwrap();
            assert_eq!(quiz.review().unwrap().len(), 1);
        }

        #[test]
        fn end_to_end_two_of_three() {
            let mut quiz = started_quiz(QuestionCount::Limit(2));
            let ordered: Vec<Question> = quiz.attempt().unwrap().questions().to_vec();
            let again = build_session(
                &three_question_bank(),
                &CategoryFilter::All,
                42,
                QuestionCount::Limit(2),
            )
            .unwrap();
            assert_eq!(ordered, again);

            let right = correct_of_current(&quiz);
            quiz.choose(right).unwrap();
            quiz.advance().unwrap();
            let wrong = wrong_of_current(&quiz);
            quiz.choose(wrong).unwrap();
            assert_eq!(quiz.current_score(), 1);
            assert_eq!(quiz.advance().unwrap(), Advance::Finished);

            assert_eq!(quiz.current_score(), 1);
            assert_eq!(quiz.progress_percent(), 100);

            let review = quiz.review().unwrap();
            assert_eq!(review.len(), 2);
            assert!(review[0].is_correct);
            assert!(!review[1].is_correct);
            assert_eq!(review[0].question_id, ordered[0].id);
            assert_eq!(review[1].question_id, ordered[1].id);
            assert_eq!(review[1].chosen_text.as_deref(), ordered[1].option(wrong));
            assert_eq!(review[1].correct_text, ordered[1].correct_option());
        }
    }
}

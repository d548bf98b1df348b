use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::bank::{QuestionBank, ALL_LABEL};
use crate::models::Question;
use crate::shuffle::shuffle;

/// Questions per attempt offered by the setup screen.
pub const COUNT_CHOICES: [QuestionCount; 4] = [
    QuestionCount::Limit(10),
    QuestionCount::Limit(20),
    QuestionCount::Limit(40),
    QuestionCount::All,
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("question count must be a positive number or 'all', got '{0}'")]
    InvalidCount(String),

    #[error("no questions match category '{0}'")]
    EmptyPool(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Blank input or "all" (any case) selects every category.
    pub fn parse_label(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_LABEL) {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(trimmed.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_LABEL,
            CategoryFilter::Only(category) => category,
        }
    }

    pub fn matches(&self, question: &Question) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => question.category == *category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionCount {
    All,
    Limit(usize),
}

impl Default for QuestionCount {
    fn default() -> Self {
        QuestionCount::Limit(20)
    }
}

impl QuestionCount {
    /// Number of questions actually used for a pool of `pool_len`.
    pub fn effective(&self, pool_len: usize) -> usize {
        match self {
            QuestionCount::All => pool_len,
            QuestionCount::Limit(n) => (*n).min(pool_len),
        }
    }

    pub fn label(&self) -> String {
        match self {
            QuestionCount::All => ALL_LABEL.to_string(),
            QuestionCount::Limit(n) => n.to_string(),
        }
    }
}

impl fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for QuestionCount {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(ALL_LABEL) {
            return Ok(QuestionCount::All);
        }
        match trimmed.parse::<i64>() {
            Ok(n) if n > 0 => usize::try_from(n)
                .map(QuestionCount::Limit)
                .map_err(|_| SessionError::InvalidCount(trimmed.to_string())),
            _ => Err(SessionError::InvalidCount(trimmed.to_string())),
        }
    }
}

/// Filters the bank, shuffles the pool with `seed`, then keeps the first
/// `count` questions.
pub fn build_session(
    bank: &QuestionBank,
    filter: &CategoryFilter,
    seed: u64,
    count: QuestionCount,
) -> Result<Vec<Question>, SessionError> {
    if count == QuestionCount::Limit(0) {
        return Err(SessionError::InvalidCount("0".to_string()));
    }

    let pool: Vec<Question> = bank
        .questions()
        .iter()
        .filter(|q| filter.matches(q))
        .cloned()
        .collect();

    if pool.is_empty() {
        return Err(SessionError::EmptyPool(filter.label().to_string()));
    }

    let mut ordered = shuffle(&pool, seed);
    ordered.truncate(count.effective(pool.len()));

    debug!(
        filter = %filter,
        seed,
        pool = pool.len(),
        selected = ordered.len(),
        "built session"
    );

    Ok(ordered)
}

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::models::Question;

const BUILTIN_BANK: &str = include_str!("../data/questions.json");

/// Label of the filter entry that selects every category.
pub const ALL_LABEL: &str = "All";

#[derive(Debug, Error)]
pub enum BankError {
    #[error("question bank is empty")]
    Empty,

    #[error("question #{position} has an empty id")]
    MissingId { position: usize },

    #[error("duplicate question id '{0}'")]
    DuplicateId(String),

    #[error("question '{0}' has an empty category")]
    MissingCategory(String),

    #[error("question '{id}' has category '{category}', which has surrounding spaces or is reserved")]
    InvalidCategory { id: String, category: String },

    #[error("question '{id}' has {count} options, at least 2 are required")]
    TooFewOptions { id: String, count: usize },

    #[error("question '{id}' marks option {index} correct but has only {count} options")]
    CorrectIndexOutOfRange {
        id: String,
        index: usize,
        count: usize,
    },

    #[error("failed to parse question bank: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read question bank {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read-only, validated collection of questions in authoring order.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        validate(&questions)?;
        Ok(Self { questions })
    }

    /// The bank compiled into the binary.
    pub fn builtin() -> Result<Self, BankError> {
        Self::from_json(BUILTIN_BANK)
    }

    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BankError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bank = Self::from_json(&json)?;
        debug!(path = %path.display(), questions = bank.len(), "loaded question bank");
        Ok(bank)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Distinct categories in the order they first appear.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .map(|q| q.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Categories prefixed with the [`ALL_LABEL`] sentinel, as offered to a picker.
    pub fn filter_labels(&self) -> Vec<&str> {
        std::iter::once(ALL_LABEL)
            .chain(self.categories())
            .collect()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.questions.iter().any(|q| q.category == category)
    }

    pub fn count_in(&self, category: &str) -> usize {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .count()
    }
}

fn validate(questions: &[Question]) -> Result<(), BankError> {
    if questions.is_empty() {
        return Err(BankError::Empty);
    }

    let mut ids = HashSet::new();
    for (position, q) in questions.iter().enumerate() {
        if q.id.trim().is_empty() {
            return Err(BankError::MissingId {
                position: position + 1,
            });
        }
        if !ids.insert(q.id.as_str()) {
            return Err(BankError::DuplicateId(q.id.clone()));
        }
        if q.category.trim().is_empty() {
            return Err(BankError::MissingCategory(q.id.clone()));
        }
        // Categories must survive a round trip through a filter label.
        if q.category.trim() != q.category || q.category.eq_ignore_ascii_case(ALL_LABEL) {
            return Err(BankError::InvalidCategory {
                id: q.id.clone(),
                category: q.category.clone(),
            });
        }
        if q.options.len() < 2 {
            return Err(BankError::TooFewOptions {
                id: q.id.clone(),
                count: q.options.len(),
            });
        }
        if q.correct_index >= q.options.len() {
            return Err(BankError::CorrectIndexOutOfRange {
                id: q.id.clone(),
                index: q.correct_index,
                count: q.options.len(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::make_question;

    fn small_bank() -> QuestionBank {
        QuestionBank::new(vec![
            make_question("G-1", "Grammar", 0),
            make_question("V-1", "Vocabulary", 1),
            make_question("G-2", "Grammar", 2),
        ])
        .unwrap()
    }

    mod builtin_tests {
        use super::*;

        #[test]
        fn builtin_bank_loads() {
            let bank = QuestionBank::builtin().unwrap();
            assert_eq!(bank.len(), 90);
        }

        #[test]
        fn builtin_bank_has_ten_categories() {
            let bank = QuestionBank::builtin().unwrap();
            let categories = bank.categories();
            assert_eq!(categories.len(), 10);
            assert_eq!(categories[0], "Learning Theories");
            assert_eq!(categories[9], "Feedback & Error Correction");
        }

        #[test]
        fn builtin_every_category_has_questions() {
            let bank = QuestionBank::builtin().unwrap();
            for category in bank.categories() {
                assert!(bank.count_in(category) > 0, "{} is empty", category);
            }
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn categories_in_first_occurrence_order() {
            assert_eq!(small_bank().categories(), vec!["Grammar", "Vocabulary"]);
        }

        #[test]
        fn filter_labels_start_with_all() {
            assert_eq!(
                small_bank().filter_labels(),
                vec![ALL_LABEL, "Grammar", "Vocabulary"]
            );
        }

        #[test]
        fn questions_keep_authoring_order() {
            let bank = small_bank();
            let ids: Vec<&str> = bank.questions().iter().map(|q| q.id.as_str()).collect();
            assert_eq!(ids, vec!["G-1", "V-1", "G-2"]);
        }

        #[test]
        fn get_by_id() {
            let bank = small_bank();
            assert_eq!(bank.get("V-1").unwrap().category, "Vocabulary");
            assert!(bank.get("missing").is_none());
        }

        #[test]
        fn has_category_and_count() {
            let bank = small_bank();
            assert!(bank.has_category("Grammar"));
            assert!(!bank.has_category("grammar"));
            assert_eq!(bank.count_in("Grammar"), 2);
            assert_eq!(bank.count_in("Spelling"), 0);
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn empty_bank_rejected() {
            assert!(matches!(QuestionBank::new(vec![]), Err(BankError::Empty)));
        }

        #[test]
        fn duplicate_id_rejected() {
            let result = QuestionBank::new(vec![
                make_question("G-1", "Grammar", 0),
                make_question("G-1", "Grammar", 1),
            ]);
            assert!(matches!(result, Err(BankError::DuplicateId(id)) if id == "G-1"));
        }

        #[test]
        fn blank_id_rejected() {
            let result = QuestionBank::new(vec![
                make_question("G-1", "Grammar", 0),
                make_question("  ", "Grammar", 0),
            ]);
            assert!(matches!(result, Err(BankError::MissingId { position: 2 })));
        }

        #[test]
        fn blank_category_rejected() {
            let result = QuestionBank::new(vec![make_question("G-1", "", 0)]);
            assert!(matches!(result, Err(BankError::MissingCategory(_))));
        }

        #[test]
        fn padded_category_rejected() {
            let result = QuestionBank::new(vec![
                make_question("G-1", "Grammar ", 0),
                make_question("V-1", "Vocabulary", 0),
            ]);
            assert!(matches!(
                result,
                Err(BankError::InvalidCategory { category, .. }) if category == "Grammar "
            ));
        }

        #[test]
        fn all_label_category_rejected() {
            for name in ["All", "all", "ALL"] {
                let result = QuestionBank::new(vec![
                    make_question("G-1", "Grammar", 0),
                    make_question("X-1", name, 0),
                ]);
                assert!(
                    matches!(result, Err(BankError::InvalidCategory { .. })),
                    "'{}' accepted",
                    name
                );
            }
        }

        #[test]
        fn single_option_rejected() {
            let mut q = make_question("G-1", "Grammar", 0);
            q.options.truncate(1);
            let result = QuestionBank::new(vec![q]);
            assert!(matches!(
                result,
                Err(BankError::TooFewOptions { count: 1, .. })
            ));
        }

        #[test]
        fn correct_index_out_of_range_rejected() {
            let result = QuestionBank::new(vec![make_question("G-1", "Grammar", 3)]);
            assert!(matches!(
                result,
                Err(BankError::CorrectIndexOutOfRange {
                    index: 3,
                    count: 3,
                    ..
                })
            ));
        }

        #[test]
        fn malformed_json_rejected() {
            let result = QuestionBank::from_json("[{\"id\": 1}]");
            assert!(matches!(result, Err(BankError::Parse(_))));
        }

        #[test]
        fn load_missing_file_reports_path() {
            let err = QuestionBank::load("/nonexistent/exam-mcq/bank.json").unwrap_err();
            assert!(matches!(err, BankError::Io { .. }));
            assert!(err.to_string().contains("/nonexistent/exam-mcq/bank.json"));
        }

        #[test]
        fn load_reads_json_file() {
            let path = std::env::temp_dir().join(format!(
                "exam-mcq-bank-{}.json",
                std::process::id()
            ));
            let json = serde_json::to_string(small_bank().questions()).unwrap();
            std::fs::write(&path, json).unwrap();

            let bank = QuestionBank::load(&path).unwrap();
            std::fs::remove_file(&path).ok();

            assert_eq!(bank.len(), 3);
            assert_eq!(bank.categories(), vec!["Grammar", "Vocabulary"]);
        }
    }
}

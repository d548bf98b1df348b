use serde::{Deserialize, Serialize};

/// A single multiple-choice question as authored in the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    pub fn correct_option(&self) -> &str {
        self.option(self.correct_index).unwrap_or_default()
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_index
    }
}

/// Letter shown in front of an option: 0 -> 'A', 1 -> 'B', ...
pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i))
        .unwrap_or('?')
}

/// Inverse of [`option_letter`], case-insensitive.
pub fn option_index(letter: char) -> Option<usize> {
    let upper = letter.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some(usize::from(upper as u8 - b'A'))
    } else {
        None
    }
}

/// One recorded answer. `choice` is `None` when the question was left blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub choice: Option<usize>,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, choice: usize) -> Self {
        Self {
            question_id: question_id.into(),
            choice: Some(choice),
        }
    }
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
pub(crate) fn make_question(id: &str, category: &str, correct_index: usize) -> Question {
    Question {
        id: id.to_string(),
        category: category.to_string(),
        prompt: format!("Prompt for {}", id),
        options: vec![
            format!("{} option A", id),
            format!("{} option B", id),
            format!("{} option C", id),
        ],
        correct_index,
        explanation: Some(format!("Because {}", id)),
    }
}

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Answer, Question};

/// One line of the post-attempt review, in session order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    pub number: usize,
    pub question_id: String,
    pub category: String,
    pub prompt: String,
    pub chosen_index: Option<usize>,
    pub chosen_text: Option<String>,
    pub correct_index: usize,
    pub correct_text: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

// First answer per question wins; later duplicates are ignored.
fn answers_by_id(answers: &[Answer]) -> HashMap<&str, Option<usize>> {
    let mut by_id = HashMap::with_capacity(answers.len());
    for answer in answers {
        by_id
            .entry(answer.question_id.as_str())
            .or_insert(answer.choice);
    }
    by_id
}

/// Counts questions whose answer matches the correct option.
///
/// Answers are matched by question id, so their order is irrelevant. Answers
/// for unknown ids are ignored and unanswered questions count as wrong.
pub fn score(questions: &[Question], answers: &[Answer]) -> usize {
    let by_id = answers_by_id(answers);
    questions
        .iter()
        .filter(|q| by_id.get(q.id.as_str()).copied().flatten() == Some(q.correct_index))
        .count()
}

/// Rounded percentage, 0 for an empty attempt.
pub fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (part.min(total) as f64 * 100.0 / total as f64).round();
    pct as u8
}

pub fn review(questions: &[Question], answers: &[Answer]) -> Vec<ReviewEntry> {
    let by_id = answers_by_id(answers);
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let chosen = by_id.get(q.id.as_str()).copied().flatten();
            ReviewEntry {
                number: i + 1,
                question_id: q.id.clone(),
                category: q.category.clone(),
                prompt: q.prompt.clone(),
                chosen_index: chosen,
                chosen_text: chosen.and_then(|c| q.option(c)).map(str::to_string),
                correct_index: q.correct_index,
                correct_text: q.correct_option().to_string(),
                is_correct: chosen == Some(q.correct_index),
                explanation: q.explanation.clone(),
            }
        })
        .collect()
}

// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Trivia questions and extraction of them from model output.

use serde::{Deserialize, Serialize};
use serde_json::Value;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Questions requested from the model and kept from its answer.
pub const QUIZ_QUESTION_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// Why model output produced no usable questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuizFailure {
    #[error("NO_CANDIDATE")]
    NoCandidate,
    #[error("INVALID_RESPONSE")]
    InvalidResponse,
}

impl QuizFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizFailure::NoCandidate => "NO_CANDIDATE",
            QuizFailure::InvalidResponse => "INVALID_RESPONSE",
        }
    }
}

/// Remove markdown code fences the model sometimes wraps JSON in.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse model text into at most five normalized questions.
///
/// Strict JSON first; failing that, the span from the first `[` to the last
/// `]`. Anything else is `InvalidResponse`, as is an empty result.
pub fn parse_quiz_text(raw: &str) -> Result<Vec<QuizQuestion>, QuizFailure> {
    let text = strip_code_fences(raw);

    let value = match serde_json::from_str::<Value>(&text) {
        Ok(value) => value,
        Err(_) => extract_array_span(&text)
            .and_then(|span| serde_json::from_str::<Value>(span).ok())
            .ok_or(QuizFailure::InvalidResponse)?,
    };

    let questions = normalize_questions(&value);
    if questions.is_empty() {
        return Err(QuizFailure::InvalidResponse);
    }
    Ok(questions)
}

fn extract_array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First present, non-empty string among `keys`.
fn first_text(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| item.get(*k).and_then(scalar_to_string))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Normalize a parsed JSON value into questions.
///
/// Non-arrays yield nothing. Accepts `prompt`, `choices` and `answer` as
/// aliases and drops items with an empty question, fewer than two options
/// or no correct answer.
pub fn normalize_questions(value: &Value) -> Vec<QuizQuestion> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .take(QUIZ_QUESTION_COUNT)
        .filter_map(|item| {
            let question = first_text(item, &["question", "prompt"]);
            let options: Vec<String> = ["options", "choices"]
                .iter()
                .find_map(|k| item.get(*k).and_then(Value::as_array))
                .map(|opts| opts.iter().filter_map(scalar_to_string).collect())
                .unwrap_or_default();
            let correct_answer = first_text(item, &["correctAnswer", "answer"]);

            (!question.is_empty() && options.len() >= 2 && !correct_answer.is_empty()).then(
                || QuizQuestion {
                    question,
                    options,
                    correct_answer,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"[
        {"question": "Q1?", "options": ["a", "b", "c", "d"], "correctAnswer": "a"},
        {"prompt": "Q2?", "choices": ["x", "y"], "answer": "y"}
    ]"#;

    #[test]
    fn test_strict_parse_with_aliases() {
        let questions = parse_quiz_text(GOOD).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].question, "Q2?");
        assert_eq!(questions[1].options, vec!["x", "y"]);
        assert_eq!(questions[1].correct_answer, "y");
    }

    #[test]
    fn test_code_fences_are_stripped() {
        let fenced = format!("```json\n{}\n```", GOOD);
        assert_eq!(parse_quiz_text(&fenced).unwrap().len(), 2);
    }

    #[test]
    fn test_fallback_extracts_array_span() {
        let noisy = format!("Sure! Here is your quiz:\n{}\nEnjoy.", GOOD);
        assert_eq!(parse_quiz_text(&noisy).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_items_dropped() {
        let raw = r#"[
            {"question": "", "options": ["a", "b"], "correctAnswer": "a"},
            {"question": "One option", "options": ["a"], "correctAnswer": "a"},
            {"question": "No answer", "options": ["a", "b"]},
            {"question": "  Numbers  ", "options": [1, 2, 3], "answer": 2}
        ]"#;
        let questions = parse_quiz_text(raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Numbers");
        assert_eq!(questions[0].options, vec!["1", "2", "3"]);
        assert_eq!(questions[0].correct_answer, "2");
    }

    #[test]
    fn test_only_first_five_considered() {
        let item = r#"{"question": "Q", "options": ["a", "b"], "correctAnswer": "a"}"#;
        let raw = format!("[{}]", vec![item; 8].join(","));
        assert_eq!(parse_quiz_text(&raw).unwrap().len(), QUIZ_QUESTION_COUNT);
    }

    #[test]
    fn test_failures() {
        assert_eq!(parse_quiz_text("not json"), Err(QuizFailure::InvalidResponse));
        assert_eq!(parse_quiz_text("[]"), Err(QuizFailure::InvalidResponse));
        assert_eq!(
            parse_quiz_text(r#"{"questions": []}"#),
            Err(QuizFailure::InvalidResponse)
        );
        assert_eq!(parse_quiz_text("] backwards ["), Err(QuizFailure::InvalidResponse));
    }

    #[test]
    fn test_failure_serializes_as_reason_code() {
        assert_eq!(
            serde_json::to_value(QuizFailure::NoCandidate).unwrap(),
            "NO_CANDIDATE"
        );
        assert_eq!(QuizFailure::InvalidResponse.to_string(), "INVALID_RESPONSE");
    }
}

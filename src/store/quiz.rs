use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::QuestionError, poll::poll_title};

/// Explanation attached to a poll when the question was stored without one.
pub const DEFAULT_EXPLANATION: &str = "Great job or keep learning!";

// Telegram quiz poll limits.
pub const MAX_OPTIONS: usize = 10;
pub const MAX_OPTION_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 300;
pub const MAX_EXPLANATION_LEN: usize = 200;

fn default_explanation() -> String {
    DEFAULT_EXPLANATION.to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    question: String,
    options: Vec<String>,
    correct_option: String,
    #[serde(default = "default_explanation")]
    explanation: String,
}

/// A question drawn from the store together with the category it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedQuestion {
    category: String,
    question: QuizQuestion,
}

impl fmt::Display for QuizQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut options = String::new();
        for (i, option) in self.options().iter().enumerate() {
            let mark = if *option == self.correct_option { 'V' } else { 'X' };
            options.push_str(&format!("{}){} ({})\n", i + 1, option, mark));
        }

        write!(f, "{}\n{}", self.question(), options)
    }
}

impl QuizQuestion {
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
        explanation: Option<String>,
    ) -> Self {
        Self {
            question: question.into(),
            options,
            correct_option: correct_option.into(),
            explanation: explanation.unwrap_or_else(default_explanation),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Position of the correct option, matched by exact string.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_option)
    }

    /// Checks that the question can be posted as a quiz poll under `category`.
    pub fn validate(&self, category: &str) -> Result<(), QuestionError> {
        let invalid = |field, reason: String| Err(QuestionError { field, reason });

        if self.question.trim().is_empty() {
            return invalid("question", "question text is empty".to_owned());
        }
        let title_len = poll_title(category, &self.question).chars().count();
        if title_len > MAX_TITLE_LEN {
            return invalid(
                "question",
                format!("poll title is {title_len} characters, at most {MAX_TITLE_LEN} allowed"),
            );
        }
        if !(2..=MAX_OPTIONS).contains(&self.options.len()) {
            return invalid(
                "options",
                format!(
                    "between 2 and {MAX_OPTIONS} options are required, got {}",
                    self.options.len()
                ),
            );
        }
        if let Some(i) = self
            .options
            .iter()
            .position(|o| o.trim().is_empty() || o.chars().count() > MAX_OPTION_LEN)
        {
            return invalid(
                "options",
                format!("option {} must be 1 to {MAX_OPTION_LEN} characters", i + 1),
            );
        }
        if self.correct_index().is_none() {
            return invalid(
                "correct_option",
                format!("'{}' is not one of the options", self.correct_option),
            );
        }
        if self.explanation.chars().count() > MAX_EXPLANATION_LEN {
            return invalid(
                "explanation",
                format!("longer than {MAX_EXPLANATION_LEN} characters"),
            );
        }
        Ok(())
    }
}

impl SelectedQuestion {
    pub fn new(category: impl Into<String>, question: QuizQuestion) -> Self {
        Self {
            category: category.into(),
            question,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn question(&self) -> &QuizQuestion {
        &self.question
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_explanation_falls_back_to_default() {
        let q = QuizQuestion::new("Q?", options(&["a", "b"]), "a", None);
        assert_eq!(q.explanation(), DEFAULT_EXPLANATION);

        let q: QuizQuestion =
            serde_json::from_str(r#"{"question": "Q?", "options": ["a", "b"], "correct_option": "a"}"#)
                .unwrap();
        assert_eq!(q.explanation(), DEFAULT_EXPLANATION);
    }

    #[test]
    fn empty_explanation_is_kept() {
        let q: QuizQuestion = serde_json::from_str(
            r#"{"question": "Q?", "options": ["a", "b"], "correct_option": "a", "explanation": ""}"#,
        )
        .unwrap();
        assert_eq!(q.explanation(), "");

        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains(r#""explanation":"""#), "{json}");
    }

    #[test]
    fn correct_index_uses_exact_match() {
        let q = QuizQuestion::new(
            "Flutter language?",
            options(&["Java", "Kotlin", "Dart", "Swift"]),
            "Dart",
            None,
        );
        assert_eq!(q.correct_index(), Some(2));

        let q = QuizQuestion::new("Q?", options(&["Dart", "Swift"]), "dart", None);
        assert_eq!(q.correct_index(), None);
    }

    #[test]
    fn validate_rejects_malformed_questions() {
        let single = QuizQuestion::new("Q?", options(&["only"]), "only", None);
        assert_eq!(single.validate("linux").unwrap_err().field, "options");

        let missing = QuizQuestion::new("Q?", options(&["a", "b"]), "c", None);
        let err = missing.validate("linux").unwrap_err();
        assert_eq!(err.field, "correct_option");
        assert!(err.reason.contains("'c'"));

        let blank = QuizQuestion::new(" ", options(&["a", "b"]), "a", None);
        assert_eq!(blank.validate("linux").unwrap_err().field, "question");
    }

    #[test]
    fn validate_enforces_poll_limits() {
        let eleven: Vec<String> = (1..=11).map(|i| i.to_string()).collect();
        let q = QuizQuestion::new("Q?", eleven, "1", None);
        assert_eq!(q.validate("linux").unwrap_err().field, "options");

        let long_option = QuizQuestion::new("Q?", vec!["a".into(), "b".repeat(101)], "a", None);
        assert_eq!(long_option.validate("linux").unwrap_err().field, "options");

        // "[Linux] " takes 8 of the 300 title characters.
        let fits = QuizQuestion::new("q".repeat(292), options(&["a", "b"]), "a", None);
        assert!(fits.validate("linux").is_ok());
        let too_long = QuizQuestion::new("q".repeat(293), options(&["a", "b"]), "a", None);
        assert_eq!(too_long.validate("linux").unwrap_err().field, "question");

        let explained = QuizQuestion::new("Q?", options(&["a", "b"]), "a", Some("é".repeat(201)));
        assert_eq!(explained.validate("linux").unwrap_err().field, "explanation");
        let explained = QuizQuestion::new("Q?", options(&["a", "b"]), "a", Some("é".repeat(200)));
        assert!(explained.validate("linux").is_ok());
    }
}

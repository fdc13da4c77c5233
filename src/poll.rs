use crate::{error::DispatchError, store::SelectedQuestion};

/// Everything needed to post one quiz poll, independent of the recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPoll {
    title: String,
    options: Vec<String>,
    correct_index: u8,
    explanation: String,
}

impl QuizPoll {
    pub fn build(selected: &SelectedQuestion) -> Result<Self, DispatchError> {
        let question = selected.question();

        let idx = question
            .correct_index()
            .ok_or_else(|| DispatchError::OptionNotFound {
                question: question.question().to_owned(),
                correct: question.correct_option().to_owned(),
            })?;
        let correct_index =
            u8::try_from(idx).map_err(|_| DispatchError::TooManyOptions {
                question: question.question().to_owned(),
                count: question.options().len(),
            })?;

        Ok(Self {
            title: poll_title(selected.category(), question.question()),
            options: question.options().to_vec(),
            correct_index,
            explanation: question.explanation().to_owned(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_index(&self) -> u8 {
        self.correct_index
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

/// `[Web Development] question`
pub fn poll_title(category: &str, question: &str) -> String {
    format!("[{}] {}", display_category(category), question)
}

/// `web_development` -> `Web Development`
///
/// Underscores become spaces; a letter is uppercased when it follows a
/// non-letter and lowercased otherwise, so `python3x` -> `Python3X`.
pub fn display_category(category: &str) -> String {
    let mut title = String::with_capacity(category.len());
    let mut after_letter = false;

    for c in category.chars() {
        if c == '_' {
            title.push(' ');
            after_letter = false;
            continue;
        }
        if after_letter {
            title.extend(c.to_lowercase());
        } else {
            title.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    title
}

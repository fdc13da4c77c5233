use teloxide::{types::BotCommand, utils::command::parse_command};
use tracing::warn;

use crate::poll::display_category;

/// Generic trigger, picks a question from any category.
pub const QUIZ_TRIGGER: &str = "quiz";
pub const HELP_TRIGGER: &str = "help";
pub const ADD_QUIZ_TRIGGER: &str = "addquiz";
pub const ADD_CATEGORY_TRIGGER: &str = "addcategory";

/// A recognized command, resolved from the text of an incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Quiz { category: Option<String> },
    Help,
    AddQuiz(String),
    AddCategory(String),
}

/// Maps trigger names to the category they dispatch.
#[derive(Debug, Clone)]
pub struct TriggerTable {
    quizzes: Vec<(String, Option<String>)>,
}

/// `web_development` -> `webdevelopment_quiz`
pub fn trigger_name(category: &str) -> String {
    format!("{}_quiz", category.replace('_', ""))
}

fn is_valid_command(name: &str) -> bool {
    (1..=32).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl TriggerTable {
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a str>) -> Self {
        let mut quizzes = vec![(QUIZ_TRIGGER.to_owned(), None)];

        for category in categories {
            let name = trigger_name(category);
            if !is_valid_command(&name) {
                warn!(
                    "Category '{}' can't be used as command /{}, it is only reachable through /{}",
                    category, name, QUIZ_TRIGGER
                );
                continue;
            }
            if quizzes.iter().any(|(existing, _)| *existing == name) {
                warn!("Command /{} is already taken, skipping '{}'", name, category);
                continue;
            }
            quizzes.push((name, Some(category.to_owned())));
        }

        Self { quizzes }
    }

    /// `Some(None)` is the generic trigger, `None` an unknown name.
    pub fn category_for(&self, trigger: &str) -> Option<Option<&str>> {
        self.quizzes
            .iter()
            .find(|(name, _)| name == trigger)
            .map(|(_, category)| category.as_deref())
    }

    /// Resolves a message text such as `/python_quiz@my_bot` into a trigger.
    pub fn parse(&self, text: &str, bot_username: &str) -> Option<Trigger> {
        let (command, _) = parse_command(text, bot_username)?;
        let command = command.to_lowercase();
        let args = text
            .trim()
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim().to_owned())
            .unwrap_or_default();

        match command.as_str() {
            HELP_TRIGGER => Some(Trigger::Help),
            ADD_QUIZ_TRIGGER => Some(Trigger::AddQuiz(args)),
            ADD_CATEGORY_TRIGGER => Some(Trigger::AddCategory(args)),
            other => self.category_for(other).map(|category| Trigger::Quiz {
                category: category.map(str::to_owned),
            }),
        }
    }

    pub fn bot_commands(&self) -> Vec<BotCommand> {
        self.quizzes
            .iter()
            .map(|(name, category)| BotCommand::new(name, describe(category.as_deref())))
            .chain([BotCommand::new(HELP_TRIGGER, "display help.")])
            .collect()
    }

    pub fn help_text(&self) -> String {
        let mut text = String::from("Available commands:\n");
        for (name, category) in &self.quizzes {
            text.push_str(&format!("/{} - {}\n", name, describe(category.as_deref())));
        }
        text.push_str(&format!("/{} - display help.", HELP_TRIGGER));
        text
    }
}

fn describe(category: Option<&str>) -> String {
    match category {
        Some(category) => format!("post a {} quiz", display_category(category)),
        None => "post a quiz from a random category".to_owned(),
    }
}

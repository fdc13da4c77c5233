use std::sync::Arc;

use teloxide::{prelude::Requester, types::Message, Bot};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::{
    config::BotConfig, dispatcher::QuizDispatcher, sender::PollSender, store::QuizStore,
    triggers::TriggerTable, HandlerResult,
};

/// Arguments of `/addquiz`:
/// `<category> | <question> | <option; option; ...> | <correct> [| <explanation>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub category: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: String,
    pub explanation: Option<String>,
}

pub const ADD_QUIZ_USAGE: &str =
    "Usage: /addquiz <category> | <question> | <option; option; ...> | <correct option> [| <explanation>]";

impl NewQuestion {
    pub fn parse(args: &str) -> Result<Self, String> {
        let parts: Vec<&str> = args.split('|').map(str::trim).collect();
        if !(4..=5).contains(&parts.len()) {
            return Err(format!("expected 4 or 5 fields, got {}", parts.len()));
        }
        if parts[..4].iter().any(|p| p.is_empty()) {
            return Err("category, question, options and correct option can't be empty".into());
        }

        Ok(Self {
            category: parts[0].to_owned(),
            question: parts[1].to_owned(),
            options: parts[2]
                .split(';')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_owned)
                .collect(),
            correct_option: parts[3].to_owned(),
            explanation: parts.get(4).filter(|e| !e.is_empty()).map(|e| e.to_string()),
        })
    }
}

fn sender_username(msg: &Message) -> Option<&str> {
    msg.from.as_ref().and_then(|user| user.username.as_deref())
}

/// Telegram usernames are case-insensitive.
fn is_admin(sender: Option<&str>, admin: Option<&str>) -> bool {
    match (sender, admin) {
        (Some(sender), Some(admin)) => sender.eq_ignore_ascii_case(admin),
        _ => false,
    }
}

#[instrument(level = "info", skip(sender, dispatcher))]
pub(crate) async fn run_quiz<Sender: PollSender + Send + Sync>(
    sender: Sender,
    dispatcher: Arc<QuizDispatcher>,
    category: Option<String>,
) -> HandlerResult {
    let report = dispatcher.dispatch(&sender, category.as_deref()).await?;
    info!(
        "'{}' quiz delivered to {}/{} destinations",
        report.category,
        report.delivered.len(),
        report.delivered.len() + report.failed.len()
    );
    Ok(())
}

pub(crate) async fn help(bot: Bot, msg: Message, triggers: Arc<TriggerTable>) -> HandlerResult {
    bot.send_message(msg.chat.id, triggers.help_text()).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, msg, store, config))]
pub(crate) async fn add_quiz(
    bot: Bot,
    msg: Message,
    store: Arc<RwLock<QuizStore>>,
    config: Arc<BotConfig>,
    args: String,
) -> HandlerResult {
    if !is_admin(sender_username(&msg), config.admin_name()) {
        warn!("{:?} is not allowed to add quizzes", sender_username(&msg));
        return Ok(());
    }

    let new = match NewQuestion::parse(&args) {
        Ok(new) => new,
        Err(reason) => {
            bot.send_message(msg.chat.id, format!("Invalid input: {reason}.\n{ADD_QUIZ_USAGE}"))
                .await?;
            return Ok(());
        }
    };

    let reply = {
        let mut store = store.write().await;
        match store.add_question(
            &new.category,
            &new.question,
            new.options,
            &new.correct_option,
            new.explanation,
        ) {
            Ok(()) => {
                let added = store
                    .questions(&new.category)
                    .and_then(<[_]>::last)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                format!("Question added to '{}':\n{}", new.category, added)
            }
            Err(e) => {
                warn!("Failed to add a question: {e}");
                format!("Failed to add the question: {e}")
            }
        }
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, msg, store, config))]
pub(crate) async fn add_category(
    bot: Bot,
    msg: Message,
    store: Arc<RwLock<QuizStore>>,
    config: Arc<BotConfig>,
    name: String,
) -> HandlerResult {
    if !is_admin(sender_username(&msg), config.admin_name()) {
        warn!("{:?} is not allowed to add categories", sender_username(&msg));
        return Ok(());
    }

    let reply = match store.write().await.add_category(&name) {
        Ok(()) => format!(
            "Category '{name}' added. It is available through /quiz now and gets its own command after a restart."
        ),
        Err(e) => {
            warn!("Failed to add a category: {e}");
            format!("Failed to add the category: {e}")
        }
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_question() {
        let new = NewQuestion::parse(
            "flutter | What is the primary programming language used in Flutter? | Java; Kotlin; Dart; Swift | Dart | Dart is developed by Google.",
        )
        .unwrap();

        assert_eq!(new.category, "flutter");
        assert_eq!(new.options, vec!["Java", "Kotlin", "Dart", "Swift"]);
        assert_eq!(new.correct_option, "Dart");
        assert_eq!(new.explanation.as_deref(), Some("Dart is developed by Google."));
    }

    #[test]
    fn explanation_is_optional() {
        let new = NewQuestion::parse("linux | What lists files? | ls; cd | ls").unwrap();
        assert_eq!(new.explanation, None);

        let new = NewQuestion::parse("linux | What lists files? | ls; cd | ls |  ").unwrap();
        assert_eq!(new.explanation, None);
    }

    #[test]
    fn only_the_configured_sender_is_admin() {
        assert!(is_admin(Some("dilan"), Some("dilan")));
        assert!(is_admin(Some("Dilan"), Some("dilan")));
        assert!(!is_admin(Some("techwithdilanchat"), Some("dilan")));
        assert!(!is_admin(None, Some("dilan")));
        assert!(!is_admin(Some("dilan"), None));
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(NewQuestion::parse("linux | What lists files?").is_err());
        assert!(NewQuestion::parse("linux |  | ls; cd | ls").is_err());
        assert!(NewQuestion::parse("a | b | c | d | e | f").is_err());
    }
}

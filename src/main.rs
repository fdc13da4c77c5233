use std::sync::Arc;

use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use techquizbot::config::{BotConfig, LogFormat};
use techquizbot::dispatcher::QuizDispatcher;
use techquizbot::schema::schema;
use techquizbot::store::QuizStore;
use techquizbot::triggers::TriggerTable;

fn init_tracing(config: &BotConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(config.log_level())?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_line_number(true)
        .with_target(false);

    match config.log_format() {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.finish())?,
    }

    // teloxide reports through `log`
    tracing_log::LogTracer::init()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to read the bot configuration: {e}");
            std::process::exit(1)
        }
    };

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to set up logging: {e}");
        std::process::exit(1)
    }

    let mut store = match QuizStore::load(config.quiz_file()) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to load the quiz file. Error: {e}");
            std::process::exit(1)
        }
    };

    match store.seed_sample_question() {
        Ok(true) => info!("Quiz file was empty, added the sample Flutter question"),
        Ok(false) => {}
        Err(e) => warn!("Initial quiz addition failed: {e}"),
    }

    if config.channels().is_empty() && config.groups().is_empty() {
        warn!("No channels or groups configured, quizzes won't be delivered anywhere");
    }

    let triggers = Arc::new(TriggerTable::new(store.categories()));
    let store = Arc::new(RwLock::new(store));
    let quiz_dispatcher = Arc::new(QuizDispatcher::new(
        store.clone(),
        config.channels().to_vec(),
        config.groups().to_vec(),
    ));

    let bot = Bot::new(config.token());
    if let Err(e) = bot.set_my_commands(triggers.bot_commands()).await {
        warn!("Failed to register the command list: {e}");
    }

    let webhook = config.webhook().cloned();
    let config = Arc::new(config);

    info!("Starting bot...");

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![store, quiz_dispatcher, triggers, config])
        .default_handler(|update| async move {
            debug!("Ignoring update {:?}", update.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred while handling a command",
        ))
        .enable_ctrlc_handler()
        .build();

    if let Some(webhook) = webhook {
        let listener = match webhooks::axum(bot, Options::new(webhook.addr, webhook.url)).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to build a webhook listener: {e}");
                std::process::exit(1)
            }
        };
        dispatcher
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await
    } else {
        dispatcher.dispatch().await
    }
}

pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod poll;
pub mod schema;
pub mod sender;
pub mod store;
pub mod triggers;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

pub mod json_store;
pub mod quiz;

pub use json_store::{QuizStore, DEFAULT_CATEGORIES, FALLBACK_CATEGORY};
pub use quiz::{QuizQuestion, SelectedQuestion, DEFAULT_EXPLANATION};

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, info, instrument, warn};

use super::quiz::{QuizQuestion, SelectedQuestion};
use crate::error::StoreError;

/// Categories written to a freshly created quiz file, in stored order.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "flutter",
    "linux",
    "cybersecurity",
    "web_development",
    "python",
    "general_programming",
];

/// Category used for unknown names and for empty categories.
pub const FALLBACK_CATEGORY: &str = "general_programming";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Category {
    name: String,
    questions: Vec<QuizQuestion>,
}

/// Categorized quiz questions backed by a single JSON file.
///
/// Every mutation rewrites the whole file through a sibling temporary file and
/// a rename. Only one process may own a given file.
#[derive(Debug)]
pub struct QuizStore {
    path: PathBuf,
    categories: Vec<Category>,
}

impl QuizStore {
    /// Reads the quiz file, creating the default skeleton if it doesn't exist.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        match fs::read_to_string(&path) {
            Ok(json) => {
                let categories = parse_store(&json).map_err(|reason| {
                    StoreError::StorageCorrupt {
                        path: path.clone(),
                        reason,
                    }
                })?;
                let store = Self { path, categories };
                info!(
                    "Loaded {} questions in {} categories from {}",
                    store.question_count(),
                    store.categories.len(),
                    store.path.display()
                );
                Ok(store)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "{} not found, creating the default quiz file",
                    path.display()
                );
                let store = Self {
                    path,
                    categories: DEFAULT_CATEGORIES
                        .iter()
                        .map(|name| Category {
                            name: name.to_string(),
                            questions: Vec::new(),
                        })
                        .collect(),
                };
                store.save()?;
                Ok(store)
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Overwrites the quiz file with the full in-memory store.
    pub fn save(&self) -> Result<(), StoreError> {
        let io_error = |source: io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let file: IndexMap<&str, &[QuizQuestion]> = self
            .categories
            .iter()
            .map(|c| (c.name.as_str(), c.questions.as_slice()))
            .collect();

        let json = serde_json::to_string_pretty(&file).map_err(|e| io_error(e.into()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, json).map_err(io_error)?;
        fs::rename(&tmp_path, &self.path).map_err(io_error)?;

        debug!("Saved quiz file {}", self.path.display());
        Ok(())
    }

    /// Appends a question to an existing category and persists the store.
    #[instrument(level = "info", skip(self, options, explanation))]
    pub fn add_question(
        &mut self,
        category: &str,
        question: &str,
        options: Vec<String>,
        correct_option: &str,
        explanation: Option<String>,
    ) -> Result<(), StoreError> {
        let idx = self
            .position(category)
            .ok_or_else(|| StoreError::UnknownCategory(category.to_owned()))?;

        let new_question = QuizQuestion::new(question, options, correct_option, explanation);
        new_question.validate(category)?;

        self.categories[idx].questions.push(new_question);

        if let Err(e) = self.save() {
            self.categories[idx].questions.pop();
            return Err(e);
        }

        info!("Added a question to '{}'", category);
        Ok(())
    }

    /// Registers a new, empty category and persists the store.
    #[instrument(level = "info", skip(self))]
    pub fn add_category(&mut self, name: &str) -> Result<(), StoreError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(StoreError::InvalidCategoryName(name.to_owned()));
        }
        if self.position(name).is_some() {
            return Err(StoreError::DuplicateCategory(name.to_owned()));
        }

        self.categories.push(Category {
            name: name.to_owned(),
            questions: Vec::new(),
        });

        if let Err(e) = self.save() {
            self.categories.pop();
            return Err(e);
        }

        info!("Added category '{}'", name);
        Ok(())
    }

    /// Adds the Flutter sample question when the store holds no question at all.
    pub fn seed_sample_question(&mut self) -> Result<bool, StoreError> {
        if self.question_count() > 0 || self.position("flutter").is_none() {
            return Ok(false);
        }

        self.add_question(
            "flutter",
            "What is the primary programming language used in Flutter?",
            ["Java", "Kotlin", "Dart", "Swift"].map(String::from).to_vec(),
            "Dart",
            Some(
                "Dart is the official programming language developed by Google for building \
                 Flutter applications. It provides excellent performance and supports both \
                 mobile and web platforms."
                    .to_owned(),
            ),
        )?;
        Ok(true)
    }

    pub fn random_question(&self, category: Option<&str>) -> Result<SelectedQuestion, StoreError> {
        self.random_question_with(category, &mut rand::thread_rng())
    }

    /// Picks a question uniformly at random.
    ///
    /// Without a category one is chosen uniformly among all categories. Unknown
    /// categories resolve to [`FALLBACK_CATEGORY`], and so do empty ones.
    pub fn random_question_with<R: Rng + ?Sized>(
        &self,
        category: Option<&str>,
        rng: &mut R,
    ) -> Result<SelectedQuestion, StoreError> {
        let requested = match category.filter(|c| !c.is_empty()) {
            Some(name) => name.to_owned(),
            None => self
                .categories
                .choose(rng)
                .map(|c| c.name.clone())
                .ok_or_else(|| StoreError::EmptyStore(FALLBACK_CATEGORY.to_owned()))?,
        };

        let resolved = match self.position(&requested) {
            Some(idx) => &self.categories[idx],
            None => {
                debug!("Unknown category '{}', using '{}'", requested, FALLBACK_CATEGORY);
                self.fallback()
                    .ok_or_else(|| StoreError::EmptyStore(requested.clone()))?
            }
        };

        if let Some(question) = resolved.questions.choose(rng) {
            return Ok(SelectedQuestion::new(&resolved.name, question.clone()));
        }

        debug!("Category '{}' is empty, using '{}'", resolved.name, FALLBACK_CATEGORY);
        let fallback = self
            .fallback()
            .ok_or_else(|| StoreError::EmptyStore(requested.clone()))?;

        fallback
            .questions
            .choose(rng)
            .map(|q| SelectedQuestion::new(&fallback.name, q.clone()))
            .ok_or(StoreError::EmptyStore(requested))
    }

    /// Category names in stored order.
    pub fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn questions(&self, category: &str) -> Option<&[QuizQuestion]> {
        self.position(category)
            .map(|idx| self.categories[idx].questions.as_slice())
    }

    pub fn question_count(&self) -> usize {
        self.categories.iter().map(|c| c.questions.len()).sum()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn position(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == category)
    }

    fn fallback(&self) -> Option<&Category> {
        self.position(FALLBACK_CATEGORY)
            .map(|idx| &self.categories[idx])
    }
}

fn parse_store(json: &str) -> Result<Vec<Category>, String> {
    let mut de = serde_json::Deserializer::from_str(json);
    let file: IndexMap<String, Vec<QuizQuestion>> =
        serde_path_to_error::deserialize(&mut de).map_err(|e| {
            let path = e.path().to_string();
            let inner = e.into_inner();
            if inner.is_syntax() || inner.is_eof() {
                format!("invalid JSON: {inner}")
            } else if path == "." {
                format!("expected an object mapping category names to questions: {inner}")
            } else {
                format!("{path}: {inner}")
            }
        })?;
    de.end().map_err(|e| format!("invalid JSON: {e}"))?;

    file.into_iter()
        .map(|(name, questions)| {
            for (i, question) in questions.iter().enumerate() {
                question
                    .validate(&name)
                    .map_err(|e| format!("{name}[{i}].{}: {}", e.field, e.reason))?;
            }
            Ok::<_, String>(Category { name, questions })
        })
        .collect()
}

//! Subject catalog and prompt construction.

use rand::Rng;

use menagerie_core::defaults::PROMPT_TEMPLATE;
use menagerie_core::{Error, Result};

/// Animals a generation job may depict.
pub const ANIMALS: &[&str] = &[
    "cat", "dog", "elephant", "lion", "tiger", "bear", "giraffe", "zebra", "panda", "koala", "fox",
    "wolf", "rabbit", "deer", "penguin", "owl", "eagle", "dolphin", "whale", "octopus",
];

/// Non-empty set of subjects to draw from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCatalog {
    subjects: Vec<String>,
}

impl Default for SubjectCatalog {
    fn default() -> Self {
        Self::animals()
    }
}

impl SubjectCatalog {
    /// Build a catalog from arbitrary subjects. Blank entries are dropped.
    pub fn new<I, S>(subjects: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let subjects: Vec<String> = subjects
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.trim().is_empty())
            .collect();

        if subjects.is_empty() {
            return Err(Error::InvalidInput(
                "Subject catalog must not be empty".to_string(),
            ));
        }
        Ok(Self { subjects })
    }

    /// The built-in animal catalog.
    pub fn animals() -> Self {
        Self {
            subjects: ANIMALS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Pick a subject uniformly at random.
    pub fn choose(&self) -> &str {
        let index = rand::thread_rng().gen_range(0..self.subjects.len());
        &self.subjects[index]
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Generation prompt for a subject.
pub fn build_prompt(subject: &str) -> String {
    PROMPT_TEMPLATE.replace("{subject}", subject)
}

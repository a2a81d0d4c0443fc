use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The closed set of genre tags tracks can be published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Gospel,
    Existential,
    Clank,
    Prompt,
}

impl Genre {
    pub const ALL: [Genre; 4] = [
        Genre::Gospel,
        Genre::Existential,
        Genre::Clank,
        Genre::Prompt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Gospel => "gospel",
            Genre::Existential => "existential",
            Genre::Clank => "clank",
            Genre::Prompt => "prompt",
        }
    }

    /// Parses a genre tag. Returns None for anything outside the set,
    /// callers decide whether that means "no filter" or a rejection.
    pub fn parse(s: &str) -> Option<Genre> {
        Genre::ALL.iter().copied().find(|g| g.as_str() == s)
    }

    /// Comma-separated list of all valid tags, for rejection messages.
    pub fn valid_list() -> String {
        Genre::ALL
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

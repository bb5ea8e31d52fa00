//! Configuration for the entity resolver.

/// Terms that mark a message as a profile/points/balance question.
pub const DEFAULT_INTENT_TERMS: [&str; 3] = ["points", "balance", "profile"];

/// Name fragments recognised in messages, in scan order.
pub const DEFAULT_DIRECTORY: [(&str, &str); 3] = [
    ("alice", "user_123"),
    ("bob", "user_456"),
    ("cathy", "user_789"),
];

/// A name fragment and the record id it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Lower-case fragment searched for in the message.
    pub fragment: String,
    /// Target record id.
    pub target_id: String,
}

/// Configuration for the entity resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Lower-case intent terms; any one of them enables resolution.
    pub intent_terms: Vec<String>,
    /// Directory scanned in order; the first matching entry wins.
    pub directory: Vec<DirectoryEntry>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            intent_terms: DEFAULT_INTENT_TERMS.iter().map(|t| t.to_string()).collect(),
            directory: DEFAULT_DIRECTORY
                .iter()
                .map(|(fragment, target_id)| DirectoryEntry {
                    fragment: fragment.to_string(),
                    target_id: target_id.to_string(),
                })
                .collect(),
        }
    }
}

impl ResolverConfig {
    /// Creates a configuration with no terms and an empty directory.
    pub fn empty() -> Self {
        Self {
            intent_terms: Vec::new(),
            directory: Vec::new(),
        }
    }

    /// Adds an intent term.
    pub fn with_intent_term(mut self, term: impl AsRef<str>) -> Self {
        self.intent_terms.push(term.as_ref().to_lowercase());
        self
    }

    /// Appends a directory entry after the existing ones.
    pub fn with_entry(mut self, fragment: impl AsRef<str>, target_id: impl Into<String>) -> Self {
        self.directory.push(DirectoryEntry {
            fragment: fragment.as_ref().to_lowercase(),
            target_id: target_id.into(),
        });
        self
    }
}

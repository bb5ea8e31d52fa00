//! Entity resolution for chat messages.
//!
//! Turns a free-text message and the requester's identity into the id of
//! the profile being asked about. Matching is keyword based: a message must
//! contain one of the intent terms, after which the name directory is
//! scanned in table order. Messages without a name are about the requester.
//!
//! Resolution is total. Every input yields either a target id or
//! [`Resolution::NoIntent`].

mod config;

pub use config::{DirectoryEntry, ResolverConfig, DEFAULT_DIRECTORY, DEFAULT_INTENT_TERMS};

use crate::model::Identity;

/// Result of resolving a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The message asks about the profile with this id.
    Target(String),
    /// The message is outside the profile domain.
    NoIntent,
}

impl Resolution {
    /// Returns the target id, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Resolution::Target(id) => Some(id),
            Resolution::NoIntent => None,
        }
    }
}

/// Keyword-based resolver from message text to a profile id.
#[derive(Debug, Clone, Default)]
pub struct EntityResolver {
    config: ResolverConfig,
}

impl EntityResolver {
    /// Creates a resolver with the given configuration.
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Returns the resolver configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves `query` for a requester.
    ///
    /// `default_subject` is the requester; its id is the target when the
    /// message names nobody in the directory.
    pub fn resolve(&self, query: &str, default_subject: &Identity) -> Resolution {
        let lowered = query.to_lowercase();

        let has_intent = self
            .config
            .intent_terms
            .iter()
            .any(|term| !term.is_empty() && lowered.contains(term.as_str()));
        if !has_intent {
            return Resolution::NoIntent;
        }

        // Table order decides ties, not position in the message.
        let named = self
            .config
            .directory
            .iter()
            .find(|entry| !entry.fragment.is_empty() && lowered.contains(entry.fragment.as_str()));

        match named {
            Some(entry) => Resolution::Target(entry.target_id.clone()),
            None => Resolution::Target(default_subject.id().to_string()),
        }
    }
}

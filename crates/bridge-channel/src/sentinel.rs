//! Failure sentinels per command family
//!
//! The editor signals failure by writing a plain string instead of a result.
//! Which strings mean failure differs per verb, so each verb lists its
//! sentinels explicitly. A verb with no entry has no sentinels: every payload
//! it returns is a success.

use crate::command::verbs;
use std::collections::HashMap;

/// A text pattern that marks a result payload as a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sentinel {
    /// Whole payload equals this string
    Exact(&'static str),
    /// Payload starts with this string
    Prefix(&'static str),
    /// `<target> not found`
    NotFound,
}

impl Sentinel {
    /// Does this sentinel match the (trimmed) payload text
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let text = text.trim();
        match self {
            Self::Exact(s) => text == *s,
            Self::Prefix(p) => text.starts_with(p),
            Self::NotFound => text.ends_with(" not found") && text.len() > " not found".len(),
        }
    }
}

/// Sentinels keyed by verb
#[derive(Debug, Clone, Default)]
pub struct SentinelTable {
    by_verb: HashMap<String, Vec<Sentinel>>,
}

impl SentinelTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register sentinels for a verb (appends to existing ones)
    pub fn register(&mut self, verb: impl Into<String>, sentinels: impl IntoIterator<Item = Sentinel>) {
        self.by_verb.entry(verb.into()).or_default().extend(sentinels);
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with(mut self, verb: impl Into<String>, sentinels: impl IntoIterator<Item = Sentinel>) -> Self {
        self.register(verb, sentinels);
        self
    }

    /// Sentinels for a verb
    #[must_use]
    pub fn sentinels(&self, verb: &str) -> &[Sentinel] {
        self.by_verb.get(verb).map(Vec::as_slice).unwrap_or_default()
    }

    /// First sentinel of `verb` matching `text`
    #[must_use]
    pub fn find(&self, verb: &str, text: &str) -> Option<&Sentinel> {
        self.sentinels(verb).iter().find(|s| s.matches(text))
    }
}

/// Sentinels of the known editor vocabulary
#[must_use]
pub fn default_sentinels() -> SentinelTable {
    use Sentinel::{Exact, NotFound, Prefix};

    SentinelTable::new()
        .with(verbs::CREATE_GAMEOBJECT, [Exact("Failed")])
        .with(verbs::DELETE_GAMEOBJECT, [Exact("Failed"), NotFound])
        .with(verbs::SET_TRANSFORM, [Exact("Failed"), NotFound])
        .with(verbs::ADD_COMPONENT, [Exact("Failed"), NotFound])
        .with(verbs::GET_HIERARCHY, [Exact("Failed")])
        .with(verbs::PLAY, [Exact("Failed")])
        .with(verbs::STOP, [Exact("Failed")])
        .with(verbs::REFRESH, [Exact("Failed")])
        .with(verbs::EXECUTE_MENU, [Exact("Failed"), Prefix("Menu item not found")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_trimmed() {
        assert!(Sentinel::Exact("Failed").matches("Failed\n"));
        assert!(!Sentinel::Exact("Failed").matches("Failed to parse, retried OK"));
    }

    #[test]
    fn not_found_needs_a_target() {
        assert!(Sentinel::NotFound.matches("Player not found"));
        assert!(!Sentinel::NotFound.matches(" not found"));
        assert!(!Sentinel::NotFound.matches("found"));
    }

    #[test]
    fn default_table_is_per_verb() {
        let table = default_sentinels();
        assert!(table.find(verbs::DELETE_GAMEOBJECT, "Cube not found").is_some());
        // create has no not-found convention
        assert!(table.find(verbs::CREATE_GAMEOBJECT, "Cube not found").is_none());
        // selection has no sentinels at all
        assert!(table.find(verbs::GET_SELECTION, "Failed").is_none());
        assert!(table.sentinels("unknown_verb").is_empty());
    }

    #[test]
    fn menu_prefix() {
        let table = default_sentinels();
        assert!(table
            .find(verbs::EXECUTE_MENU, "Menu item not found: Window/Foo")
            .is_some());
    }

    #[test]
    fn register_appends() {
        let mut table = SentinelTable::new();
        table.register("bake", [Sentinel::Exact("Failed")]);
        table.register("bake", [Sentinel::Prefix("Error:")]);
        assert_eq!(table.sentinels("bake").len(), 2);
    }
}

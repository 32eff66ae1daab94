//! Subscription index
//!
//! Maps a title to the subscribers interested in it. Two keys are reserved:
//!
//! - `All`: the subscriber follows every title
//! - `-<title>`: the subscriber opts out of `<title>`, even when listed under `All`

use std::collections::{BTreeSet, HashMap};

use crate::config::RetentionConfig;

/// Key meaning "subscribed to everything"
pub const ALL_TITLES: &str = "All";

/// Prefix marking an exclusion key
pub const EXCLUDE_PREFIX: char = '-';

/// Title → subscriber tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionIndex {
    by_title: HashMap<String, BTreeSet<String>>,
    /// Token → display name, for logs only
    names: HashMap<String, String>,
}

impl SubscriptionIndex {
    /// Group `(title, token)` pairs by title. Duplicates collapse.
    pub fn build<I, T, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: Into<String>,
    {
        let mut by_title: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (title, token) in pairs {
            by_title
                .entry(title.into())
                .or_default()
                .insert(token.into());
        }
        Self {
            by_title,
            names: HashMap::new(),
        }
    }

    /// Build the index from every user's subscription list
    pub fn from_config(config: &RetentionConfig) -> Self {
        let mut index = Self::build(config.users.iter().flat_map(|user| {
            user.subscriptions
                .iter()
                .map(move |title| (title.as_str(), user.token.as_str()))
        }));
        index.names = config
            .users
            .iter()
            .map(|user| (user.token.clone(), user.name.clone()))
            .collect();
        index
    }

    /// Name to log in place of a token
    pub fn display_name<'a>(&'a self, token: &str) -> &'a str {
        self.names.get(token).map(String::as_str).unwrap_or("<unnamed>")
    }

    /// Subscribers registered under exactly this key; empty when unknown
    pub fn subscribers(&self, key: &str) -> BTreeSet<String> {
        self.by_title.get(key).cloned().unwrap_or_default()
    }

    /// `subs(key) ∪ subs("All") − subs("-key")`
    pub fn effective_subscribers(&self, key: &str) -> BTreeSet<String> {
        let excluded = self.subscribers(&format!("{EXCLUDE_PREFIX}{key}"));

        let mut effective = self.subscribers(key);
        effective.extend(self.subscribers(ALL_TITLES));
        effective.retain(|token| !excluded.contains(token));
        effective
    }
}

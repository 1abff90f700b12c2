//! Query keys addressing cached results.
//!
//! A key is a tag followed by optional parameter objects, e.g.
//! `["events", {"search": "rust"}]`. Filters match keys by prefix, with
//! parameter objects matching when the filter's parameters are a subset.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Tag shared by every event query.
pub const EVENTS_TAG: &str = "events";

/// Tag of the selectable image catalogue query.
pub const EVENT_IMAGES_TAG: &str = "events-images";

/// One segment of a query key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum KeySegment {
    Tag(String),
    Params(BTreeMap<String, String>),
}

impl KeySegment {
    /// Returns true if this segment satisfies the filter segment.
    fn satisfies(&self, filter: &KeySegment) -> bool {
        match (self, filter) {
            (KeySegment::Tag(a), KeySegment::Tag(b)) => a == b,
            (KeySegment::Params(params), KeySegment::Params(wanted)) => wanted
                .iter()
                .all(|(name, value)| params.get(name) == Some(value)),
            _ => false,
        }
    }
}

/// Identifier of a cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    /// Creates a key with a single tag segment.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(vec![KeySegment::Tag(tag.into())])
    }

    /// Appends a tag segment.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.0.push(KeySegment::Tag(tag.into()));
        self
    }

    /// Adds a parameter, extending a trailing parameter object if there is one.
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        match self.0.last_mut() {
            Some(KeySegment::Params(params)) => {
                params.insert(name.into(), value.to_string());
            }
            _ => {
                let mut params = BTreeMap::new();
                params.insert(name.into(), value.to_string());
                self.0.push(KeySegment::Params(params));
            }
        }
        self
    }

    /// Returns the key's segments.
    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    /// Returns the value of a parameter in any parameter segment.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.0.iter().find_map(|segment| match segment {
            KeySegment::Params(params) => params.get(name).map(String::as_str),
            KeySegment::Tag(_) => None,
        })
    }

    /// Returns true if `prefix` partially matches this key.
    ///
    /// Every segment of `prefix` must be satisfied by the segment at the same
    /// position in this key; extra trailing segments in this key are allowed.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        prefix.0.len() <= self.0.len()
            && prefix
                .0
                .iter()
                .zip(self.0.iter())
                .all(|(wanted, segment)| segment.satisfies(wanted))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

/// Selects the cached queries an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    key: QueryKey,
    exact: bool,
}

impl QueryFilter {
    /// Matches the key and every key it is a partial prefix of.
    pub fn prefix(key: QueryKey) -> Self {
        Self { key, exact: false }
    }

    /// Matches only the exact key.
    pub fn exact(key: QueryKey) -> Self {
        Self { key, exact: true }
    }

    /// Returns the filter's key.
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Returns true if the filter selects `key`.
    pub fn matches(&self, key: &QueryKey) -> bool {
        if self.exact {
            key == &self.key
        } else {
            key.starts_with(&self.key)
        }
    }
}

/// Returns the key shared by every event query: `["events"]`.
pub fn events_key() -> QueryKey {
    QueryKey::new(EVENTS_TAG)
}

/// Returns the key for a single event: `["events", {"id": id}]`.
pub fn event_key(id: &str) -> QueryKey {
    events_key().with_param("id", id)
}

/// Returns the key for a search: `["events", {"search": term}]`.
pub fn events_search_key(term: &str) -> QueryKey {
    events_key().with_param("search", term)
}

/// Returns the key for the most recent events: `["events", {"max": max}]`.
pub fn recent_events_key(max: u32) -> QueryKey {
    events_key().with_param("max", max)
}

/// Returns the key for the selectable image catalogue: `["events-images"]`.
pub fn event_images_key() -> QueryKey {
    QueryKey::new(EVENT_IMAGES_TAG)
}

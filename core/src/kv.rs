//! Line-oriented `key=value` text parsing.
//!
//! The `headers` and `data` settings are free text with one pair per line.
//! Lines that do not split into exactly one key and one value are dropped
//! without complaint; the admin typing into a textarea gets no validation.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Insertion-ordered string map with last-write-wins semantics.
///
/// Re-inserting an existing key moves it to the end, so iteration follows the
/// order of each key's final appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueMap {
    entries: Vec<(String, String)>,
}

impl KeyValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key`, replacing and repositioning any earlier entry with the
    /// same key. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let previous = self
            .entries
            .iter()
            .position(|(k, _)| *k == key)
            .map(|idx| self.entries.remove(idx).1);
        self.entries.push((key, value.into()));
        previous
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Merge every entry of `other` over `self`, in `other`'s order.
    pub fn extend_from(&mut self, other: &KeyValueMap) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = KeyValueMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for KeyValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Parse newline-delimited `key=value` text.
///
/// A line yields an entry only when it contains exactly one `=` and both the
/// trimmed key and the trimmed value are non-empty.
pub fn parse(text: &str) -> KeyValueMap {
    let mut map = KeyValueMap::new();
    for line in text.split('\n') {
        if let Some((key, value)) = split_pair(line) {
            map.insert(key, value);
        }
    }
    map
}

fn split_pair(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.split('=');
    let key = parts.next()?.trim();
    let value = parts.next()?.trim();
    if parts.next().is_some() || key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

//! Free-form `key=value` annotations attached to an instance.
//!
//! Different ingestion sources contribute keys independently, so the set
//! accumulates across updates. Internally it is a sorted map; the legacy
//! comma-joined form (`k1=v1,k2=v2`) only exists at the store boundary.
//! In that form a backslash, `,` or `=` inside a key or value is escaped with a backslash.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured annotation set. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations(BTreeMap<String, String>);

impl Annotations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a single annotation.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Fold `other` into `self`; values from `other` win on key collisions.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse the legacy comma-joined form.
    ///
    /// Segments without an unescaped `=` are dropped; later duplicates replace
    /// earlier ones. Keys are trimmed, values are kept verbatim.
    #[must_use]
    pub fn parse_legacy(raw: &str) -> Self {
        let mut annotations = Self::new();
        for segment in split_unescaped(raw, ',') {
            let mut parts = split_unescaped(segment, '=');
            let key = parts.next().map(|k| unescape(k.trim()));
            let value = parts.next().map(unescape);
            if let (Some(key), Some(mut value)) = (key, value) {
                // Further unescaped '=' belong to the value.
                for rest in parts {
                    value.push('=');
                    value.push_str(&unescape(rest));
                }
                if !key.is_empty() {
                    annotations.insert(key, value);
                }
            }
        }
        annotations
    }

    /// Render the legacy comma-joined form, keys in sorted order.
    #[must_use]
    pub fn to_legacy(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write_escaped(f, key)?;
            f.write_str("=")?;
            write_escaped(f, value)?;
            first = false;
        }
        Ok(())
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, raw: &str) -> fmt::Result {
    for c in raw.chars() {
        if matches!(c, '\\' | ',' | '=') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    Ok(())
}

/// Split on `sep` wherever it is not preceded by an escaping backslash.
fn split_unescaped(raw: &str, sep: char) -> impl Iterator<Item = &str> {
    let mut escaped = false;
    raw.split(move |c: char| {
        if escaped {
            escaped = false;
            return false;
        }
        if c == '\\' {
            escaped = true;
            return false;
        }
        c == sep
    })
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            // A trailing lone backslash is kept as is.
            out.push(chars.next().unwrap_or('\\'));
        } else {
            out.push(c);
        }
    }
    out
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Annotations {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

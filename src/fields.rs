use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Ordered mapping from a match key to the hash that replaces quoted values
/// on lines containing that key.
///
/// Entries keep insertion order (document order when decoded from JSON), so
/// [`FieldHashMap::lookup`] is deterministic. Keys that could both match the
/// same text (one key containing another) are rejected on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldHashMap {
    entries: Vec<(String, String)>,
}

impl FieldHashMap {
    /// Builds the single-field mapping from a field name and its hash.
    pub fn single(field: &str, hash: &str) -> Result<Self> {
        let mut map = Self::default();
        map.insert(field, hash)?;
        Ok(map)
    }

    /// Decodes the multi-field input.
    ///
    /// The input is a JSON object whose values are strings shaped
    /// `"<matchKey>-<hash>"`. The outer object key only labels the entry in
    /// error messages; the lookup key is the value's left segment.
    ///
    /// # Errors
    ///
    /// * [`Error::Fields`] if the input is not a JSON object, if a value is
    ///   not a string, or if a value does not split into exactly two
    ///   non-empty segments around a single `-`.
    /// * [`Error::Fields`] for duplicate or overlapping match keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use formula_bump::fields::FieldHashMap;
    ///
    /// let map = FieldHashMap::from_json(r#"{"x":"sha256-abc123"}"#).unwrap();
    /// assert_eq!(map.lookup("  sha256 \"old\""), Some("abc123"));
    /// ```
    pub fn from_json(input: &str) -> Result<Self> {
        let object: Map<String, Value> =
            serde_json::from_str(input).map_err(|e| Error::Fields(e.to_string()))?;

        let mut map = Self::default();
        for (label, value) in &object {
            let raw = match value {
                Value::String(s) => s.as_str(),
                other => {
                    return Err(Error::Fields(format!(
                        "entry `{label}` must be a string, found {other}"
                    )));
                }
            };
            let (key, hash) = split_entry(label, raw)?;
            map.insert(key, hash)?;
        }
        Ok(map)
    }

    /// Adds a mapping, rejecting keys that would make a line lookup ambiguous.
    pub fn insert(&mut self, key: &str, hash: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::Fields(String::from("match key is empty")));
        }
        if hash.is_empty() {
            return Err(Error::Fields(format!("hash for `{key}` is empty")));
        }

        for (existing, _) in &self.entries {
            if existing == key {
                return Err(Error::Fields(format!("duplicate match key `{key}`")));
            }
            if existing.contains(key) || key.contains(existing.as_str()) {
                return Err(Error::Fields(format!(
                    "match keys `{existing}` and `{key}` overlap"
                )));
            }
        }

        self.entries.push((key.to_string(), hash.to_string()));
        Ok(())
    }

    /// Returns the hash of the first key that occurs in `line`.
    pub fn lookup(&self, line: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| line.contains(key.as_str()))
            .map(|(_, hash)| hash.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, h)| (k.as_str(), h.as_str()))
    }
}

/// Splits `"<key>-<hash>"` on its only hyphen.
fn split_entry<'a>(label: &str, raw: &'a str) -> Result<(&'a str, &'a str)> {
    let value = raw.trim_matches('"');
    let mut parts = value.split('-');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(hash), None) if !key.is_empty() && !hash.is_empty() => Ok((key, hash)),
        _ => Err(Error::Fields(format!(
            "entry `{label}` must look like `<key>-<hash>`, got `{value}`"
        ))),
    }
}

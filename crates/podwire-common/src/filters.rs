//! Filter sets and their query parameter encoding.
//!
//! The engine expects all filters in a single `filters` query value: a JSON
//! object mapping each filter name to the list of accepted values, e.g.
//! `{"type":["container"],"event":["start","die"]}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PodwireError, Result};

/// Mapping from filter name to its ordered list of values.
///
/// An empty set means "no filter" and is never sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, Vec<String>>);

impl FilterSet {
    /// Creates an empty filter set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Appends `value` to the list for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// Builder-style variant of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Parses a `name=value` pair, as given to a `--filter` flag, and adds it.
    ///
    /// # Errors
    ///
    /// Returns [`PodwireError::Encoding`] if the pair has no `=` or an empty name.
    pub fn insert_pair(&mut self, pair: &str) -> Result<()> {
        let (name, value) = pair.split_once('=').ok_or_else(|| PodwireError::Encoding {
            message: format!("filter {pair:?} is not of the form name=value"),
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(PodwireError::Encoding {
                message: format!("filter {pair:?} has an empty name"),
            });
        }
        self.insert(name, value);
        Ok(())
    }

    /// Returns `true` if no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values for one filter name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Iterates over `(name, values)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl FromIterator<(String, Vec<String>)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Encodes a filter set into the single token carried by the `filters`
/// query parameter.
///
/// Returns `Ok(None)` for an empty set: the parameter is omitted rather
/// than sent as an encoded empty object.
///
/// # Errors
///
/// Returns [`PodwireError::Encoding`] if a filter name is empty or the set
/// cannot be serialized.
pub fn encode_filters(filters: &FilterSet) -> Result<Option<String>> {
    if filters.is_empty() {
        return Ok(None);
    }
    if let Some((name, _)) = filters.iter().find(|(name, _)| name.trim().is_empty()) {
        return Err(PodwireError::Encoding {
            message: format!("filter name {name:?} is empty"),
        });
    }
    serde_json::to_string(&filters.0)
        .map(Some)
        .map_err(|e| PodwireError::Encoding {
            message: e.to_string(),
        })
}

/// Decodes a `filters` token back into a filter set.
///
/// # Errors
///
/// Returns [`PodwireError::Encoding`] if the token is not a JSON object of
/// string arrays.
pub fn decode_filters(token: &str) -> Result<FilterSet> {
    serde_json::from_str(token).map_err(|e| PodwireError::Encoding {
        message: e.to_string(),
    })
}

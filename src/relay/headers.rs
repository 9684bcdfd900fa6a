//! Ordered, case-insensitive header list.
//!
//! `http::HeaderMap` groups values by name and does not promise to keep the
//! order in which distinct names were inserted. Relayed headers are kept in a
//! plain list instead so the order seen on the wire is the order sent on.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// An ordered list of header pairs with case-insensitive lookup.
///
/// Names are `HeaderName`s, which are normalised to lowercase on
/// construction, so `get("User-Agent")` and `get("user-agent")` agree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to a single value.
    ///
    /// Every existing value for `name` is removed; the new value takes the
    /// position of the first removed one, or goes to the end if there was none.
    pub fn insert(&mut self, name: HeaderName, value: HeaderValue) {
        let position = self.entries.iter().position(|(n, _)| *n == name);
        self.entries.retain(|(n, _)| *n != name);
        match position {
            Some(index) => self.entries.insert(index, (name, value)),
            None => self.entries.push((name, value)),
        }
    }

    /// Add a value without touching existing values for the same name.
    pub fn append(&mut self, name: HeaderName, value: HeaderValue) {
        self.entries.push((name, value));
    }

    /// First value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// All values for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a HeaderValue> + 'a {
        let name = HeaderName::from_bytes(name.as_bytes()).ok();
        self.entries
            .iter()
            .filter(move |(n, _)| Some(n) == name.as_ref())
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a `HeaderMap`, appending so multi-value headers survive.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            map.append(name.clone(), value.clone());
        }
        map
    }
}

impl From<&HeaderMap> for HeaderList {
    fn from(map: &HeaderMap) -> Self {
        Self {
            entries: map.iter().map(|(n, v)| (n.clone(), v.clone())).collect(),
        }
    }
}

impl From<HeaderMap> for HeaderList {
    fn from(map: HeaderMap) -> Self {
        Self::from(&map)
    }
}

impl FromIterator<(HeaderName, HeaderValue)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (HeaderName, HeaderValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a HeaderList {
    type Item = &'a (HeaderName, HeaderValue);
    type IntoIter = std::slice::Iter<'a, (HeaderName, HeaderValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

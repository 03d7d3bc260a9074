use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Deserialize};

use crate::value::{Dict, Value};

/// A free-form string keyed metadata bag.
///
/// Every [`Item`](crate::Item) carries one, as does the
/// [`Site`](crate::Site) for build-global values. Plugins may read and write
/// any key; no key is reserved by the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    map: Dict,
}

impl Metadata {
    #[inline(always)]
    pub fn new() -> Self {
        Metadata::default()
    }

    #[inline(always)]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    #[inline(always)]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.map.get_mut(key)
    }

    /// A string view of the value at `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    #[inline(always)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<Value>
        where K: Into<Arc<str>>, V: Into<Value>
    {
        self.map.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key)
    }

    pub fn get_or_insert_with<K, V, F>(&mut self, key: K, f: F) -> &mut Value
        where K: Into<Arc<str>>, V: Into<Value>, F: FnOnce() -> V
    {
        self.map.entry(key.into()).or_insert_with(|| f().into())
    }

    /// Copies every entry of `dict` into `self`, overwriting existing keys.
    pub fn append_all(&mut self, dict: &Dict) {
        for (k, v) in dict {
            self.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.map.iter()
    }

    #[inline(always)]
    pub fn keys(&self) -> impl Iterator<Item = &Arc<str>> {
        self.map.keys()
    }
}

impl From<Dict> for Metadata {
    fn from(map: Dict) -> Self {
        Metadata { map }
    }
}

impl fmt::Display for Metadata {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#?}", self.map)
    }
}

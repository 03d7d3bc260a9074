use std::collections::BTreeMap;
use std::sync::Arc;

use glob::Pattern;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::item::Item;
use crate::value::{Metadata, Value};

/// The global metadata key collections are stored beneath.
pub const COLLECTIONS_KEY: &str = "collections";

/// The mutable state of one build: global metadata plus the file map.
///
/// Files are keyed by their forward-slash path relative to the source root.
/// The key an item sits under when the plugin chain finishes is the path the
/// output writer persists it to, so at any instant each key names at most one
/// item. Iteration order is lexicographic by key and therefore deterministic
/// across runs.
///
/// A `Site` is owned by exactly one [`Pipeline::build`](crate::Pipeline::build)
/// run and handed to each plugin by `&mut` in turn; there is never concurrent
/// mutation.
#[derive(Debug, Default)]
pub struct Site {
    pub metadata: Metadata,
    files: BTreeMap<Arc<str>, Item>,
}

impl Site {
    pub fn new() -> Site {
        Site::default()
    }

    pub fn from_files(files: BTreeMap<Arc<str>, Item>) -> Site {
        Site { metadata: Metadata::new(), files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        self.files.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Item> {
        self.files.get_mut(key)
    }

    pub fn insert<K: Into<Arc<str>>>(&mut self, key: K, item: Item) -> Option<Item> {
        self.files.insert(key.into(), item)
    }

    pub fn remove(&mut self, key: &str) -> Option<Item> {
        self.files.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Item)> {
        self.files.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Arc<str>, &mut Item)> {
        self.files.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Arc<str>> {
        self.files.keys()
    }

    pub(crate) fn files(&self) -> &BTreeMap<Arc<str>, Item> {
        &self.files
    }

    /// Entries whose full key matches the glob `pattern`, in key order.
    pub fn glob<'a>(&'a self, pattern: &'a Pattern)
        -> impl Iterator<Item = (&'a Arc<str>, &'a Item)>
    {
        self.files.iter().filter(|(key, _)| pattern.matches(key))
    }

    /// A snapshot of the keys matching the glob `pattern`.
    ///
    /// Plugins that mutate the file map while visiting matches iterate this
    /// snapshot and re-resolve each key with [`get_mut`](Self::get_mut),
    /// skipping keys another mutation has since removed. A key renamed away
    /// mid-loop is simply not revisited under its old name.
    pub fn glob_keys(&self, pattern: &Pattern) -> Vec<Arc<str>> {
        self.files.keys()
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect()
    }

    /// A snapshot of the keys the regex `pattern` finds a match in. Search
    /// semantics: the pattern need not span the whole key.
    pub fn regex_keys(&self, pattern: &Regex) -> Vec<Arc<str>> {
        self.files.keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect()
    }

    /// Moves the item at `from` to the key `to`.
    ///
    /// Later plugins observe the item only under its new key. Renaming a key
    /// to itself is a no-op. Renaming onto an occupied key replaces the
    /// occupant (last writer wins); this is deliberate, enabling content
    /// replacement such as expanding `page.md` over `page.html`.
    ///
    /// Any mention of `from` in the key lists under
    /// `metadata["collections"]` is rewritten to `to`, so collections built
    /// before a rename keep resolving to their members.
    pub fn rename<K: Into<Arc<str>>>(&mut self, from: &str, to: K) -> Result<()> {
        let to = to.into();
        if *from == *to && self.files.contains_key(from) {
            return Ok(());
        }

        let Some(item) = self.files.remove(from) else {
            return err! {
                "cannot rename a file that does not exist",
                "from" => from,
                "to" => to,
            };
        };

        if self.files.insert(to.clone(), item).is_some() {
            debug!(from, to = &*to, "rename replaced an existing file");
        }

        self.rekey_collections(from, &to);
        Ok(())
    }

    // Collections hold file keys; a rename must not leave them dangling.
    fn rekey_collections(&mut self, from: &str, to: &Arc<str>) {
        let Some(Value::Dict(collections)) = self.metadata.get_mut(COLLECTIONS_KEY) else {
            return;
        };

        for list in Arc::make_mut(collections).values_mut() {
            let Value::Array(keys) = list else { continue };
            for key in Arc::make_mut(keys) {
                if key.as_str() == Some(from) {
                    *key = Value::String(to.clone());
                }
            }
        }
    }
}

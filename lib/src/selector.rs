use std::fmt;
use std::sync::Arc;

use crate::item::Item;
use crate::value::Value;

/// A configured way to pull a value out of an [`Item`].
///
/// Plugin options that are "a metadata key or an arbitrary function of the
/// file" are normalized into a `Selector` when the plugin is constructed, so
/// the per-file loop calls a single closure either way. A bare string names a
/// metadata key; [`Selector::with`] accepts any function.
pub struct Selector {
    describe: Arc<str>,
    select: Box<dyn Fn(&Item) -> Option<Value> + Send + Sync>,
}

impl Selector {
    /// Selects the value stored under the metadata key `key`.
    pub fn key<K: Into<Arc<str>>>(key: K) -> Selector {
        let key = key.into();
        Selector {
            describe: format!("metadata[{key:?}]").into(),
            select: Box::new(move |item| item.metadata.get(&key).cloned()),
        }
    }

    /// Selects via an arbitrary function of the item.
    pub fn with<F>(f: F) -> Selector
        where F: Fn(&Item) -> Option<Value> + Send + Sync + 'static
    {
        Selector {
            describe: "custom function".into(),
            select: Box::new(f),
        }
    }

    pub fn select(&self, item: &Item) -> Option<Value> {
        (self.select)(item)
    }
}

impl From<&str> for Selector {
    fn from(key: &str) -> Self {
        Selector::key(key)
    }
}

impl From<String> for Selector {
    fn from(key: String) -> Self {
        Selector::key(key)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.describe).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_selector_reads_metadata() {
        let mut item = Item::new("a.md", "");
        item.metadata.insert("permalink", "/blog/");

        let selector = Selector::key("permalink");
        assert_eq!(selector.select(&item), Some("/blog/".into()));
        assert_eq!(Selector::key("absent").select(&item), None);
    }

    #[test]
    fn function_selector_sees_the_whole_item() {
        let selector = Selector::with(|item| Some(item.name().to_uppercase().into()));
        let item = Item::new("page.md", "");
        assert_eq!(selector.select(&item), Some("PAGE.MD".into()));
    }
}

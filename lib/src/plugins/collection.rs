use std::sync::Arc;

use glob::Pattern;

use crate::error::Result;
use crate::pipeline::Plugin;
use crate::selector::Selector;
use crate::site::Site;
use crate::value::{Dict, Metadata, Value};

pub use crate::site::COLLECTIONS_KEY;

/// Builds a named, ordered collection of files.
///
/// Files matching the pattern are sorted by the value the `order_by` selector
/// yields for them (stably, optionally reversed) and the resulting key list
/// is stored under `metadata["collections"][name]` on the site, where later
/// stages (typically templates listing posts) can read it back with
/// [`collection`]. Stored keys are rewritten by
/// [`Site::rename`](crate::Site::rename), so a collection stays valid when a
/// later stage renames its members. Registering the same collection name
/// twice in one build is an error, as is a matching file with no ordering
/// value.
#[derive(Debug)]
pub struct Collection {
    name: Arc<str>,
    pattern: Pattern,
    order_by: Selector,
    reverse: bool,
}

impl Collection {
    pub fn new<N, S>(name: N, pattern: &str, order_by: S) -> Result<Collection>
        where N: Into<Arc<str>>, S: Into<Selector>
    {
        Ok(Collection {
            name: name.into(),
            pattern: Pattern::new(pattern)?,
            order_by: order_by.into(),
            reverse: false,
        })
    }

    /// Sorts the collection in descending order.
    pub fn reversed(mut self) -> Collection {
        self.reverse = true;
        self
    }
}

impl Plugin for Collection {
    fn build(&self, site: &mut Site) -> Result<()> {
        let mut members = Vec::new();
        for (key, item) in site.glob(&self.pattern) {
            let order = self.order_by.select(item).ok_or_else(|| error! {
                "collection member has no ordering value",
                "collection" => self.name,
                "file" => key,
                "order by" => format!("{:?}", self.order_by),
            })?;

            members.push((order, key.clone()));
        }

        members.sort_by(|(a, _), (b, _)| a.cmp(b));
        if self.reverse {
            members.reverse();
        }

        let list: Value = members.into_iter()
            .map(|(_, key)| Value::from(key))
            .collect();

        let collections = site.metadata
            .get_or_insert_with(COLLECTIONS_KEY, || Arc::new(Dict::new()));

        let kind = collections.kind();
        let Value::Dict(dict) = collections else {
            return err! {
                "global collections slot holds a non-dict value",
                "found" => kind,
            };
        };

        let dict = Arc::make_mut(dict);
        if dict.contains_key(&*self.name) {
            return err! {
                "collection is already defined",
                "collection" => self.name,
            };
        }

        dict.insert(self.name.clone(), list);
        Ok(())
    }
}

/// Looks up a previously built collection: the ordered file keys stored under
/// `name`.
pub fn collection<'m>(metadata: &'m Metadata, name: &str) -> Option<&'m [Value]> {
    metadata.get(COLLECTIONS_KEY)?
        .as_dict()?
        .get(name)?
        .as_slice()
}

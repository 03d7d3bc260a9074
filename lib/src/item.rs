use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Chainable, Result};
use crate::value::Metadata;

/// A single file flowing through the pipeline.
///
/// An item's `name`, provenance `source` path, and `stats` snapshot are fixed
/// when the item is created; plugins mutate only its [`metadata`](Self::metadata)
/// and contents. Contents are always a byte payload: the field's type admits
/// nothing else, so a stage can never smuggle a non-byte value into the
/// output writer.
#[derive(Debug)]
pub struct Item {
    name: Arc<str>,
    source: Option<Arc<Path>>,
    stats: Option<fs::Metadata>,
    pub metadata: Metadata,
    contents: Vec<u8>,
}

impl Item {
    /// A synthetic in-memory item with no filesystem provenance.
    pub fn new<N, C>(name: N, contents: C) -> Item
        where N: Into<Arc<str>>, C: Into<Vec<u8>>
    {
        Item {
            name: name.into(),
            source: None,
            stats: None,
            metadata: Metadata::new(),
            contents: contents.into(),
        }
    }

    /// Reads the file at `path` fully into memory, snapshotting its
    /// filesystem metadata.
    pub fn load(path: &Path) -> Result<Item> {
        let stats = fs::metadata(path).chain_with(|| error! {
            "failed to stat source file",
            "file path" => path.display(),
        })?;

        let contents = fs::read(path).chain_with(|| error! {
            "failed to read source file",
            "file path" => path.display(),
        })?;

        let name = path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Item {
            name: name.into(),
            source: Some(Arc::from(path.to_path_buf().into_boxed_path())),
            stats: Some(stats),
            metadata: Metadata::new(),
            contents,
        })
    }

    /// The base file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The absolute source path this item was loaded from, if any. Useful for
    /// diagnostics only; the pipeline never reinterprets it.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The filesystem metadata captured at load time, if any.
    pub fn stats(&self) -> Option<&fs::Metadata> {
        self.stats.as_ref()
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn contents_mut(&mut self) -> &mut Vec<u8> {
        &mut self.contents
    }

    /// The contents as UTF-8, or an error naming the item.
    pub fn contents_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents).map_err(|e| error! {
            "item contents are not valid utf-8",
            "item" => self.name,
            "detail" => e,
        })
    }

    pub fn set_contents<C: Into<Vec<u8>>>(&mut self, contents: C) {
        self.contents = contents.into();
    }
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use std::{fs, io};

use rayon::prelude::*;
use tracing::info;

use crate::error::{Chainable, Result};
use crate::item::Item;
use crate::site::Site;
use crate::util;

/// A single build stage.
///
/// A plugin is invoked exactly once per build, in registration order, with
/// the shared [`Site`]. It may read and write global metadata, add, remove,
/// or [rename](Site::rename) files, and mutate any item's contents or
/// metadata. Stage N observes every mutation made by stages 1..N; there is no
/// isolation and no rollback.
///
/// Any `Fn(&mut Site) -> Result<()>` closure is a plugin, which keeps ad-hoc
/// stages cheap:
///
/// ```rust
/// use bellows::{Pipeline, Site};
/// use bellows::error::Result;
///
/// let pipeline = Pipeline::new("src", "out")
///     .with(|site: &mut Site| -> Result<()> {
///         site.metadata.insert("generator", "bellows");
///         Ok(())
///     });
/// ```
pub trait Plugin: Send + Sync {
    fn build(&self, site: &mut Site) -> Result<()>;
}

impl<F> Plugin for F
    where F: Fn(&mut Site) -> Result<()> + Send + Sync
{
    fn build(&self, site: &mut Site) -> Result<()> {
        self(site)
    }
}

struct Stage {
    name: &'static str,
    plugin: Box<dyn Plugin>,
}

/// The build orchestrator: source, destination, and an ordered plugin chain.
///
/// A build is one call to [`build`](Self::build): load the source tree,
/// execute the chain, write the surviving file set. The orchestrator performs
/// no transformation of its own.
pub struct Pipeline {
    src: PathBuf,
    dest: PathBuf,
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new<S, D>(src: S, dest: D) -> Pipeline
        where S: Into<PathBuf>, D: Into<PathBuf>
    {
        Pipeline { src: src.into(), dest: dest.into(), stages: vec![] }
    }

    /// Appends a plugin to the chain. The plugin's type name is recorded so
    /// that a mid-chain failure is attributable to its stage.
    pub fn with<P: Plugin + 'static>(mut self, plugin: P) -> Pipeline {
        self.stages.push(Stage {
            name: std::any::type_name::<P>(),
            plugin: Box::new(plugin),
        });

        self
    }

    /// Recursively deletes the destination tree. A destination that does not
    /// exist is fine; any other deletion error is fatal.
    pub fn clean(&self) -> Result<&Self> {
        match fs::remove_dir_all(&self.dest) {
            Ok(()) => Ok(self),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(self),
            Err(e) => Err(e).chain(error! {
                "failed to clean the destination directory",
                "destination" => self.dest.display(),
            }),
        }
    }

    /// Runs one build: load, execute every stage in order, write.
    ///
    /// The first stage failure aborts the build with the site left in its
    /// partially mutated state; no compensating actions are taken.
    pub fn build(&self) -> Result<()> {
        let start = Instant::now();
        info!(source = %self.src.display(), "starting the build");

        let mut site = Site::from_files(load(&self.src)?);
        info!(files = site.len(), "loaded source tree");

        for stage in &self.stages {
            info!(stage = stage.name, "executing");
            stage.plugin.build(&mut site).chain_with(|| error! {
                "plugin failed",
                "plugin" => stage.name,
            })?;
        }

        write(&self.dest, &site)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(files = site.len(), elapsed_ms, "build complete");
        Ok(())
    }
}

/// Recursively reads every regular file beneath `root` into memory, keyed by
/// its `/`-joined path relative to `root`. A missing or unreadable root is
/// fatal; an empty tree yields an empty map.
pub fn load(root: &Path) -> Result<BTreeMap<Arc<str>, Item>> {
    let mut files = BTreeMap::new();
    for entry in jwalk::WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(crate::error::Error::from_std).chain_with(|| error! {
            "failed to scan the source directory",
            "source root" => root.display(),
        })?;

        if !entry.file_type.is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).map_err(|_| error! {
            "walked file escapes the source root",
            "file path" => path.display(),
            "source root" => root.display(),
        })?;

        files.insert(util::key_for(relative), Item::load(&path)?);
    }

    Ok(files)
}

/// Writes every `(key, item)` of the site beneath `dest`, creating
/// directories on demand. Keys are disjoint destination paths and items are
/// independent once the mutation phase is over, so entries are written in
/// parallel.
pub fn write(dest: &Path, site: &Site) -> Result<()> {
    site.files()
        .par_iter()
        .map(|(key, item)| write_one(dest, key, item))
        .reduce(|| Ok(()), |a, b| match (a, b) {
            (Ok(()), r) => r,
            (Err(e), Ok(())) => Err(e),
            (Err(e1), Err(e2)) => Err(e1.chain(e2)),
        })
}

fn write_one(dest: &Path, key: &str, item: &Item) -> Result<()> {
    let mut path = dest.to_path_buf();
    path.extend(key.split('/'));

    if let Some(parent) = path.parent() {
        if parent.exists() && !parent.is_dir() {
            return err! {
                "output path collides with an existing non-directory",
                "output file" => path.display(),
                "in the way" => parent.display(),
            };
        }

        fs::create_dir_all(parent).chain_with(|| error! {
            "failed to create output directory",
            "directory" => parent.display(),
        })?;
    }

    fs::write(&path, item.contents()).chain_with(|| error! {
        "failed to write output file",
        "output file" => path.display(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    static_assertions::assert_obj_safe!(Plugin);

    #[test]
    fn later_stages_observe_earlier_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();

        let pipeline = Pipeline::new(&src, dir.path().join("out"))
            .with(|site: &mut Site| -> Result<()> {
                site.metadata.insert("x", 1);
                Ok(())
            })
            .with(|site: &mut Site| -> Result<()> {
                assert_eq!(site.metadata.get("x"), Some(&Value::from(1)));
                site.metadata.insert("x", 2);
                Ok(())
            });

        pipeline.build().unwrap();
    }

    #[test]
    fn failing_stage_aborts_with_attribution() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();

        let failed = Pipeline::new(&src, dir.path().join("out"))
            .with(|_: &mut Site| -> Result<()> { err!("boom") })
            .with(|_: &mut Site| -> Result<()> { panic!("must not run") })
            .build();

        let message = failed.unwrap_err().to_string();
        assert!(message.contains("plugin failed"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn load_keys_are_relative_and_forward_slashed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("posts/2024")).unwrap();
        fs::write(dir.path().join("top.md"), b"t").unwrap();
        fs::write(dir.path().join("posts/2024/a.md"), b"a").unwrap();

        let files = load(dir.path()).unwrap();
        let keys: Vec<_> = files.keys().map(|k| &**k).collect();
        assert_eq!(keys, ["posts/2024/a.md", "top.md"]);
        assert_eq!(files["posts/2024/a.md"].contents(), b"a");
    }

    #[test]
    fn load_missing_root_is_fatal() {
        assert!(load(Path::new("/no/such/source/root")).is_err());
    }

    #[test]
    fn write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out");

        let mut site = Site::new();
        site.insert("blog/index.html", Item::new("index.html", "<p>hi</p>"));
        site.insert("style.css", Item::new("style.css", "a{}"));

        write(&dest, &site).unwrap();
        let first = fs::read(dest.join("blog/index.html")).unwrap();

        write(&dest, &site).unwrap();
        let second = fs::read(dest.join("blog/index.html")).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(dest.join("style.css")).unwrap(), b"a{}");
    }

    #[test]
    fn write_rejects_non_directory_components() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("blog"), b"i am a file").unwrap();

        let mut site = Site::new();
        site.insert("blog/index.html", Item::new("index.html", "x"));

        assert!(write(&dest, &site).is_err());
    }

    #[test]
    fn clean_tolerates_missing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new("src", dir.path().join("never-created"));
        pipeline.clean().unwrap();
    }

    #[test]
    fn clean_removes_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out");
        fs::create_dir_all(dest.join("nested")).unwrap();
        fs::write(dest.join("nested/a.txt"), b"x").unwrap();

        Pipeline::new("src", &dest).clean().unwrap();
        assert!(!dest.exists());
    }
}

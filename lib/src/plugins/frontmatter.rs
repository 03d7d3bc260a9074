use glob::Pattern;
use tracing::warn;

use crate::error::Result;
use crate::pipeline::Plugin;
use crate::site::Site;
use crate::value::Dict;

/// Splits a leading TOML front matter block out of matching files.
///
/// A block is delimited by a `+++` line at the very start of the file and a
/// closing `+++` line; its keys are merged into the item's metadata (new keys
/// win) and the remainder becomes the item's contents. TOML datetimes are
/// stored as their RFC 3339 strings. Files without a block pass through
/// untouched. A block that fails to parse is logged and leaves that file
/// unmodified; one malformed page never aborts the build.
#[derive(Debug)]
pub struct FrontMatter {
    pattern: Pattern,
}

impl Default for FrontMatter {
    fn default() -> Self {
        FrontMatter::new()
    }
}

impl FrontMatter {
    /// Extracts front matter from every file.
    pub fn new() -> FrontMatter {
        FrontMatter { pattern: Pattern::new("*").expect("valid pattern") }
    }

    /// Extracts front matter from files whose key matches `pattern`.
    pub fn matching(pattern: &str) -> Result<FrontMatter> {
        Ok(FrontMatter { pattern: Pattern::new(pattern)? })
    }
}

impl Plugin for FrontMatter {
    fn build(&self, site: &mut Site) -> Result<()> {
        for key in site.glob_keys(&self.pattern) {
            let Some(item) = site.get_mut(&key) else { continue };
            match extract(item.contents()) {
                Ok(Some((dict, body))) => {
                    item.metadata.append_all(&dict);
                    item.set_contents(body);
                }
                Ok(None) => { }
                Err(e) => warn!(file = &*key, %e, "skipping malformed front matter"),
            }
        }

        Ok(())
    }
}

const PREFIX: &str = "+++\n";
const SUFFIX: &str = "\n+++\n";

/// Parses a front matter block, returning the parsed dictionary and the body
/// bytes. `Ok(None)` means the file has no block (binary contents included);
/// `Err` means a block is present but malformed.
fn extract(contents: &[u8]) -> Result<Option<(Dict, Vec<u8>)>> {
    let Ok(input) = std::str::from_utf8(contents) else {
        return Ok(None);
    };

    if !input.starts_with(PREFIX) {
        return Ok(None);
    }

    let Some((block, body)) = input[PREFIX.len()..].split_once(SUFFIX) else {
        return Ok(None);
    };

    let table: toml::Table = toml::from_str(block)?;
    let dict = table.into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect();

    Ok(Some((dict, body.as_bytes().to_vec())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use crate::value::Value;

    const PAGE: &str = "+++\ntitle = \"Hi\"\norder = 2\n+++\n# body\n";

    #[test]
    fn block_is_merged_and_stripped() {
        let mut site = Site::new();
        site.insert("a.md", Item::new("a.md", PAGE));

        FrontMatter::new().build(&mut site).unwrap();

        let item = site.get("a.md").unwrap();
        assert_eq!(item.metadata.get_str("title"), Some("Hi"));
        assert_eq!(item.metadata.get("order"), Some(&Value::from(2)));
        assert_eq!(item.contents(), b"# body\n");
    }

    #[test]
    fn new_keys_overwrite_existing_metadata() {
        let mut site = Site::new();
        let mut item = Item::new("a.md", PAGE);
        item.metadata.insert("title", "stale");
        site.insert("a.md", item);

        FrontMatter::new().build(&mut site).unwrap();
        assert_eq!(site.get("a.md").unwrap().metadata.get_str("title"), Some("Hi"));
    }

    #[test]
    fn datetimes_become_ordering_friendly_strings() {
        let mut site = Site::new();
        site.insert("p.md", Item::new("p.md", "+++\ndate = 2024-05-01\n+++\nbody\n"));

        FrontMatter::new().build(&mut site).unwrap();

        let item = site.get("p.md").unwrap();
        assert_eq!(item.metadata.get_str("date"), Some("2024-05-01"));
        assert_eq!(item.contents(), b"body\n");
    }

    #[test]
    fn files_without_a_block_pass_through() {
        let mut site = Site::new();
        site.insert("plain.md", Item::new("plain.md", "# no block\n"));
        site.insert("blob.png", Item::new("blob.png", vec![0xff, 0xd8, 0xff]));

        FrontMatter::new().build(&mut site).unwrap();
        assert_eq!(site.get("plain.md").unwrap().contents(), b"# no block\n");
        assert_eq!(site.get("blob.png").unwrap().contents(), &[0xff, 0xd8, 0xff]);
    }

    #[test]
    fn malformed_block_is_skipped_not_fatal() {
        let broken = "+++\nnot toml ===\n+++\nbody\n";
        let mut site = Site::new();
        site.insert("bad.md", Item::new("bad.md", broken));
        site.insert("good.md", Item::new("good.md", PAGE));

        FrontMatter::new().build(&mut site).unwrap();

        // The malformed file is left exactly as it was.
        assert_eq!(site.get("bad.md").unwrap().contents(), broken.as_bytes());
        assert!(site.get("bad.md").unwrap().metadata.is_empty());
        assert_eq!(site.get("good.md").unwrap().metadata.get_str("title"), Some("Hi"));
    }

    #[test]
    fn pattern_limits_scope() {
        let mut site = Site::new();
        site.insert("a.md", Item::new("a.md", PAGE));
        site.insert("a.txt", Item::new("a.txt", PAGE));

        FrontMatter::matching("*.md").unwrap().build(&mut site).unwrap();
        assert!(site.get("a.txt").unwrap().metadata.is_empty());
        assert!(!site.get("a.md").unwrap().metadata.is_empty());
    }
}

use glob::Pattern;
use tracing::debug;

use crate::error::Result;
use crate::pipeline::Plugin;
use crate::selector::Selector;
use crate::site::Site;

/// Moves matching files to the output path a selector computes for them.
///
/// The selector (the `"permalink"` metadata key by default) yields the target
/// path. A leading slash is ignored; an empty or slash terminated path gets
/// `index.html` appended; anything else is taken literally. A file the
/// selector yields nothing for keeps its key: a page without a permalink is
/// routine, not an error.
#[derive(Debug)]
pub struct Permalink {
    pattern: Pattern,
    selector: Selector,
}

impl Default for Permalink {
    fn default() -> Self {
        Permalink::new()
    }
}

impl Permalink {
    /// Applies the `"permalink"` metadata key to every `*.html` file.
    pub fn new() -> Permalink {
        Permalink {
            pattern: Pattern::new("*.html").expect("valid pattern"),
            selector: Selector::key("permalink"),
        }
    }

    pub fn matching(pattern: &str) -> Result<Permalink> {
        Ok(Permalink { pattern: Pattern::new(pattern)?, ..Permalink::new() })
    }

    pub fn selector<S: Into<Selector>>(mut self, selector: S) -> Permalink {
        self.selector = selector.into();
        self
    }
}

impl Plugin for Permalink {
    fn build(&self, site: &mut Site) -> Result<()> {
        for key in site.glob_keys(&self.pattern) {
            let Some(item) = site.get(&key) else { continue };
            let Some(permalink) = self.selector.select(item).and_then(|v| v.into_str().ok())
            else {
                debug!(file = &*key, "no permalink; key unchanged");
                continue;
            };

            let mut target = permalink.strip_prefix('/').unwrap_or(&permalink).to_string();
            if target.is_empty() || target.ends_with('/') {
                target.push_str("index.html");
            }

            site.rename(&key, target)?;
        }

        Ok(())
    }
}

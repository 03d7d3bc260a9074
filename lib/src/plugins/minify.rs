use glob::Pattern;

use crate::error::{Chainable, Result};
use crate::pipeline::Plugin;
use crate::site::Site;

/// Minifies matching JavaScript files in place. The key never changes.
#[derive(Debug)]
pub struct Minify {
    pattern: Pattern,
}

impl Default for Minify {
    fn default() -> Self {
        Minify::new()
    }
}

impl Minify {
    /// Minifies every `*.js` file.
    pub fn new() -> Minify {
        Minify { pattern: Pattern::new("*.js").expect("valid pattern") }
    }

    pub fn matching(pattern: &str) -> Result<Minify> {
        Ok(Minify { pattern: Pattern::new(pattern)? })
    }
}

impl Plugin for Minify {
    fn build(&self, site: &mut Site) -> Result<()> {
        for key in site.glob_keys(&self.pattern) {
            let Some(item) = site.get_mut(&key) else { continue };
            let input = item.contents_str().chain_with(|| error! {
                "javascript input must be text",
                "file" => key,
            })?;

            let minified = minifier::js::minify(input).to_string();
            item.set_contents(minified);
        }

        Ok(())
    }
}

use regex::Regex;

use crate::error::{Chainable, Result};
use crate::pipeline::Plugin;
use crate::site::Site;
use crate::util;

/// Compiles matching Sass/SCSS files to CSS.
///
/// Contents are replaced with the compiled stylesheet and the key is renamed
/// to the output extension when it differs, so later stages and the output
/// writer see `style.css` where `style.scss` went in. Compile failures are
/// fatal: a broken stylesheet is an authoring error, not a per-file nuisance.
#[derive(Debug)]
pub struct Sass {
    pattern: Regex,
    output_extension: String,
}

impl Default for Sass {
    fn default() -> Self {
        Sass::new()
    }
}

impl Sass {
    /// Compiles every `.sass`/`.scss` file into `.css`.
    pub fn new() -> Sass {
        Sass {
            pattern: Regex::new(r"\.(sass|scss)$").expect("valid regex"),
            output_extension: ".css".into(),
        }
    }

    /// Compiles files whose key the regex `pattern` matches. Search
    /// semantics: the pattern need not span the whole key.
    pub fn matching(pattern: &str) -> Result<Sass> {
        Ok(Sass { pattern: Regex::new(pattern)?, ..Sass::new() })
    }

    /// The extension compiled files should carry, including the dot.
    pub fn output_extension(mut self, ext: &str) -> Sass {
        self.output_extension = ext.into();
        self
    }
}

impl Plugin for Sass {
    fn build(&self, site: &mut Site) -> Result<()> {
        for key in site.regex_keys(&self.pattern) {
            let Some(item) = site.get_mut(&key) else { continue };
            let input = item.contents_str()?;

            let css = grass::from_string(input, &grass::Options::default())
                .chain_with(|| error! {
                    "failed to compile sass to css",
                    "file" => key,
                })?;

            item.set_contents(css);

            let renamed = util::with_extension(&key, &self.output_extension);
            if *renamed != *key {
                site.rename(&key, renamed)?;
            }
        }

        Ok(())
    }
}

use glob::Pattern;
use pulldown_cmark::{html, Options, Parser};

use crate::error::{Chainable, Result};
use crate::pipeline::Plugin;
use crate::site::Site;

/// Renders matching files from markdown to HTML in place.
///
/// Contents are replaced; the file keeps its key, leaving any extension
/// change to a later permalink or templating stage.
#[derive(Debug)]
pub struct Markdown {
    pattern: Pattern,
    options: Options,
}

impl Default for Markdown {
    fn default() -> Self {
        Markdown::new()
    }
}

impl Markdown {
    /// Renders every `*.md` file.
    pub fn new() -> Markdown {
        Markdown {
            pattern: Pattern::new("*.md").expect("valid pattern"),
            options: Options::all().difference(Options::ENABLE_SMART_PUNCTUATION),
        }
    }

    pub fn matching(pattern: &str) -> Result<Markdown> {
        Ok(Markdown { pattern: Pattern::new(pattern)?, ..Markdown::new() })
    }

    pub fn with_options(mut self, options: Options) -> Markdown {
        self.options = options;
        self
    }
}

impl Plugin for Markdown {
    fn build(&self, site: &mut Site) -> Result<()> {
        for key in site.glob_keys(&self.pattern) {
            let Some(item) = site.get_mut(&key) else { continue };
            let input = item.contents_str().chain_with(|| error! {
                "markdown input must be text",
                "file" => key,
            })?;

            let mut output = String::with_capacity(input.len() * 2);
            html::push_html(&mut output, Parser::new_ext(input, self.options));
            item.set_contents(output);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    #[test]
    fn renders_matching_files_in_place() {
        let mut site = Site::new();
        site.insert("post.md", Item::new("post.md", "# Hello\n\nsome *text*\n"));
        site.insert("raw.txt", Item::new("raw.txt", "# Not rendered\n"));

        Markdown::new().build(&mut site).unwrap();

        let html = site.get("post.md").unwrap().contents_str().unwrap();
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<em>text</em>"));
        assert_eq!(site.get("raw.txt").unwrap().contents(), b"# Not rendered\n");
    }

    #[test]
    fn binary_input_is_fatal() {
        let mut site = Site::new();
        site.insert("evil.md", Item::new("evil.md", vec![0xff, 0xfe]));
        assert!(Markdown::new().build(&mut site).is_err());
    }
}

use std::path::Path;

use glob::Pattern;
use minijinja::{context, Environment};
use tracing::warn;

use crate::error::{Chainable, Result};
use crate::pipeline::Plugin;
use crate::selector::Selector;
use crate::site::Site;
use crate::util;
use crate::value::Dict;

/// Renders each matching file's contents as a template in place.
///
/// The global build metadata is exposed to the template as `site`, alongside
/// any globals configured on the plugin. Files with no template syntax are
/// skipped without touching the engine. Render failures are fatal: a page
/// that fails to expand is an authoring error.
pub struct ContentTemplate {
    pattern: Pattern,
    env: Environment<'static>,
}

impl Default for ContentTemplate {
    fn default() -> Self {
        ContentTemplate::new()
    }
}

impl ContentTemplate {
    /// Renders every file containing template syntax.
    pub fn new() -> ContentTemplate {
        ContentTemplate {
            pattern: Pattern::new("*").expect("valid pattern"),
            env: Environment::new(),
        }
    }

    pub fn matching(pattern: &str) -> Result<ContentTemplate> {
        Ok(ContentTemplate { pattern: Pattern::new(pattern)?, ..ContentTemplate::new() })
    }

    /// Adds globals visible to every rendered file.
    pub fn globals(mut self, globals: &Dict) -> ContentTemplate {
        for (key, value) in globals {
            self.env.add_global(key.to_string(), minijinja::Value::from_serialize(value));
        }

        self
    }
}

impl Plugin for ContentTemplate {
    fn build(&self, site: &mut Site) -> Result<()> {
        for key in site.glob_keys(&self.pattern) {
            let Some(item) = site.get(&key) else { continue };
            let Ok(input) = item.contents_str() else { continue };
            if !util::is_template(input) {
                continue;
            }

            let rendered = self.env
                .render_str(input, context! { site => &site.metadata })
                .chain_with(|| error! {
                    "failed to render file as a template",
                    "file" => key,
                })?;

            if let Some(item) = site.get_mut(&key) {
                item.set_contents(rendered);
            }
        }

        Ok(())
    }
}

/// Wraps matching files in a named layout template.
///
/// Layouts are loaded from a directory; which layout a file gets is decided
/// by a selector (the `"layout"` metadata key by default). The layout renders
/// with three variables: `contents` (the file's current contents), `page`
/// (the file's metadata), and `site` (the global metadata). A file the
/// selector yields nothing for is logged and left untouched. A selected
/// layout that does not exist in the directory is a configuration error and
/// aborts the build.
///
/// If the file's extension differs from the configured output extension
/// (`.html` by default), the key is renamed, so `about.md` leaves this stage
/// as `about.html`.
pub struct LayoutTemplate {
    pattern: Pattern,
    selector: Selector,
    output_extension: Option<String>,
    env: Environment<'static>,
}

impl LayoutTemplate {
    /// Wraps every file carrying a `"layout"` metadata key, using templates
    /// from `layout_dir`.
    pub fn new<P: AsRef<Path>>(layout_dir: P) -> LayoutTemplate {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(layout_dir.as_ref()));

        // Contents handed to a layout are already rendered markup; escaping
        // them here would mangle every page.
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);

        LayoutTemplate {
            pattern: Pattern::new("*").expect("valid pattern"),
            selector: Selector::key("layout"),
            output_extension: Some(".html".into()),
            env,
        }
    }

    pub fn matching<P: AsRef<Path>>(layout_dir: P, pattern: &str) -> Result<LayoutTemplate> {
        Ok(LayoutTemplate { pattern: Pattern::new(pattern)?, ..LayoutTemplate::new(layout_dir) })
    }

    pub fn selector<S: Into<Selector>>(mut self, selector: S) -> LayoutTemplate {
        self.selector = selector.into();
        self
    }

    /// The extension rendered files should carry, including the dot, or
    /// `None` to never rename.
    pub fn output_extension(mut self, ext: Option<&str>) -> LayoutTemplate {
        self.output_extension = ext.map(String::from);
        self
    }

    /// Adds globals visible to every layout.
    pub fn globals(mut self, globals: &Dict) -> LayoutTemplate {
        for (key, value) in globals {
            self.env.add_global(key.to_string(), minijinja::Value::from_serialize(value));
        }

        self
    }
}

impl Plugin for LayoutTemplate {
    fn build(&self, site: &mut Site) -> Result<()> {
        for key in site.glob_keys(&self.pattern) {
            let Some(item) = site.get(&key) else { continue };
            let Some(layout) = self.selector.select(item).and_then(|v| v.into_str().ok())
            else {
                warn!(file = &*key, "no layout selected; file left untouched");
                continue;
            };

            let template = self.env.get_template(&layout).chain_with(|| error! {
                "selected layout does not exist",
                "file" => key,
                "layout" => layout,
            })?;

            let rendered = template
                .render(context! {
                    contents => item.contents_str()?,
                    page => &item.metadata,
                    site => &site.metadata,
                })
                .chain_with(|| error! {
                    "failed to render layout",
                    "file" => key,
                    "layout" => layout,
                })?;

            if let Some(item) = site.get_mut(&key) {
                item.set_contents(rendered);
            }

            if let Some(ext) = &self.output_extension {
                let renamed = util::with_extension(&key, ext);
                if *renamed != *key {
                    site.rename(&key, renamed)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use std::fs;

    #[test]
    fn content_template_renders_with_site_metadata() {
        let mut site = Site::new();
        site.metadata.insert("name", "world");
        site.insert("hi.html", Item::new("hi.html", "Hello {{ site.name }}!"));
        site.insert("plain.txt", Item::new("plain.txt", "no templates here"));

        ContentTemplate::new().build(&mut site).unwrap();

        assert_eq!(site.get("hi.html").unwrap().contents(), b"Hello world!");
        assert_eq!(site.get("plain.txt").unwrap().contents(), b"no templates here");
    }

    #[test]
    fn content_template_globals() {
        let mut dict = Dict::new();
        dict.insert("version".into(), "1.2".into());

        let mut site = Site::new();
        site.insert("v.html", Item::new("v.html", "v{{ version }}"));

        ContentTemplate::new().globals(&dict).build(&mut site).unwrap();
        assert_eq!(site.get("v.html").unwrap().contents(), b"v1.2");
    }

    #[test]
    fn layout_wraps_contents_and_renames() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.html"), "<main>{{ contents }}</main>").unwrap();

        let mut site = Site::new();
        let mut item = Item::new("about.md", "<p>about</p>");
        item.metadata.insert("layout", "base.html");
        site.insert("about.md", item);

        LayoutTemplate::new(dir.path()).build(&mut site).unwrap();

        assert!(!site.contains("about.md"));
        let rendered = site.get("about.html").unwrap();
        assert_eq!(rendered.contents(), b"<main><p>about</p></main>");
    }

    #[test]
    fn layout_sees_page_and_site_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let layout = "{{ site.title }} | {{ page.slug }} | {{ contents }}";
        fs::write(dir.path().join("post.html"), layout).unwrap();

        let mut site = Site::new();
        site.metadata.insert("title", "My Site");
        let mut item = Item::new("a.html", "body");
        item.metadata.insert("layout", "post.html");
        item.metadata.insert("slug", "a");
        site.insert("a.html", item);

        LayoutTemplate::new(dir.path()).build(&mut site).unwrap();
        assert_eq!(site.get("a.html").unwrap().contents(), b"My Site | a | body");
    }

    #[test]
    fn missing_layout_key_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();

        let mut site = Site::new();
        site.insert("a.html", Item::new("a.html", "body"));

        LayoutTemplate::new(dir.path()).build(&mut site).unwrap();
        assert_eq!(site.get("a.html").unwrap().contents(), b"body");
    }

    #[test]
    fn nonexistent_layout_is_fatal() {
        let dir = tempfile::tempdir().unwrap();

        let mut site = Site::new();
        let mut item = Item::new("a.html", "body");
        item.metadata.insert("layout", "nope.html");
        site.insert("a.html", item);

        assert!(LayoutTemplate::new(dir.path()).build(&mut site).is_err());
    }
}

//! The stock build stages: front matter, markdown, Sass, minification,
//! templating, permalinks, and collections.
//!
//! Every plugin here follows the same conventions. Patterns and selectors are
//! compiled when the plugin is constructed, so configuration mistakes surface
//! at registration rather than mid-build. Per-file recoverable problems (a
//! malformed front matter block, a missing layout key) are logged and leave
//! that file in its prior state; everything else propagates and aborts the
//! build.

mod frontmatter;
mod markdown;
mod minify;
mod permalink;
mod template;
mod collection;

#[cfg(feature = "sass")]
mod sass;

pub use frontmatter::*;
pub use markdown::*;
pub use minify::*;
pub use permalink::*;
pub use template::*;
pub use collection::*;

#[cfg(feature = "sass")]
pub use sass::*;

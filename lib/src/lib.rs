#![doc = svgbobdoc::transform!(
//! A plugin-pipeline toolkit for building static sites.
//!
//! # Overview
//!
//! Bellows is a library for building static site generators out of small,
//! composable build stages. It loads a source directory into memory, runs the
//! resulting file set through an ordered chain of plugins, and writes whatever
//! remains to a destination directory:
//!
//! ```svgbob
//!  +--------+     +----------------------------------+     +--------+
//!  | source |     |               Site               |     | output |
//!  |  tree  +---->|  metadata + { key -> Item } map  +---->|  tree  |
//!  +--------+     +----------------------------------+     +--------+
//!      load            ^       ^       ^       ^              write
//!                      |       |       |       |
//!                  +---+--+ +--+---+ +-+----+ +-+----+
//!                  |plugin| |plugin| |plugin| |plugin|
//!                  +------+ +------+ +------+ +------+
//!                        "in registration order"
//! ```
//!
//! The core never interprets file contents: an [`Item`] is an opaque byte
//! payload plus a free-form metadata bag, keyed in the [`Site`] by its
//! forward-slash relative path. The key a file sits under when the chain
//! finishes is the path it is written to.
//!
//! Plugins coordinate through three mechanisms:
//!
//!   * **Global metadata** on the [`Site`], for cross-stage values such as
//!     collections or site-wide settings.
//!
//!   * **Per-file metadata** on each [`Item`], typically seeded by front
//!     matter extraction and consumed by templating and permalinks.
//!
//!   * **Renames** via [`Site::rename`], the one sanctioned way to move a
//!     file to a new output path so that every later stage sees it under its
//!     new key.
//!
//! The [`plugins`] module provides the usual suspects: front matter
//! extraction, markdown rendering, Sass compilation, JS minification,
//! templating, permalinks, and ordered collections. Each is an ordinary
//! [`Plugin`] implementation; a generator is free to mix them with its own.
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod value;
pub mod item;
pub mod site;
pub mod selector;
pub mod pipeline;
pub mod plugins;

pub use value::{Value, Num, Dict, Metadata};
pub use item::Item;
pub use site::Site;
pub use selector::Selector;
pub use pipeline::{Pipeline, Plugin};

use std::path::PathBuf;
use std::time::Instant;

use bellows::error::Result;
use bellows::plugins::{Collection, ContentTemplate, FrontMatter, LayoutTemplate};
use bellows::plugins::{Markdown, Minify, Permalink};
use bellows::{Pipeline, Site};

use crate::config::Settings;

mod config;

pub const CONFIG_FILE: &str = "site.toml";

xflags::xflags! {
    /// Builds a static site from a source directory.
    cmd stoker {
        /// The source directory to build from.
        required src: PathBuf
        /// The destination directory to write the site to.
        required dest: PathBuf
        /// A directory of layout templates to wrap pages in.
        optional -l, --layouts dir: PathBuf
        /// Do not delete the destination directory first.
        optional -k, --keep
    }
}

fn pipeline(flags: &Stoker, settings: &Settings) -> Result<Pipeline> {
    let globals = settings.to_dict();

    let mut pipeline = Pipeline::new(&flags.src, &flags.dest)
        .with({
            let globals = globals.clone();
            move |site: &mut Site| -> Result<()> {
                site.metadata.append_all(&globals);
                Ok(())
            }
        })
        .with(FrontMatter::new())
        .with(Collection::new("posts", "posts/*.md", "date")?.reversed())
        .with(Markdown::new())
        .with(ContentTemplate::new().globals(&globals));

    if let Some(dir) = &flags.layouts {
        pipeline = pipeline.with(LayoutTemplate::new(dir).globals(&globals));
    }

    Ok(pipeline
        .with(bellows::plugins::Sass::new())
        .with(Minify::new())
        .with(Permalink::new()))
}

fn run() -> Result<()> {
    let flags = Stoker::from_env_or_exit();
    let settings = Settings::discover(&flags.src)?;
    let pipeline = pipeline(&flags, &settings)?;

    if !flags.keep {
        pipeline.clean()?;
    }

    pipeline.build()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let start = Instant::now();
    match run() {
        Ok(()) => println!("site built in {}ms", start.elapsed().as_millis()),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

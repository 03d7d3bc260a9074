use std::path::Path;

use serde::Deserialize;

use bellows::error::{Chainable, Result};
use bellows::value::Dict;

/// Site-wide settings read from `site.toml` in the source root. Everything in
/// the file becomes global metadata available to templates; datetimes are
/// carried as RFC 3339 strings.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub base_url: String,
    #[serde(flatten)]
    pub globals: toml::Table,
}

impl Settings {
    /// Loads `site.toml` beneath `src`, or the defaults if there is none.
    pub fn discover(src: &Path) -> Result<Settings> {
        let path = src.join(crate::CONFIG_FILE);
        if !path.exists() {
            return Ok(Settings::default());
        }

        let raw = std::fs::read_to_string(&path).chain_with(|| bellows::error! {
            "failed to read the site settings file",
            "file path" => path.display(),
        })?;

        toml::from_str(&raw).chain_with(|| bellows::error! {
            "the site settings file is not valid",
            "file path" => path.display(),
        })
    }

    /// The settings as a metadata dictionary, `base_url` included.
    pub fn to_dict(&self) -> Dict {
        let mut dict: Dict = self.globals.iter()
            .map(|(k, v)| (k.as_str().into(), v.clone().into()))
            .collect();

        dict.insert("base_url".into(), self.base_url.as_str().into());
        dict
    }
}

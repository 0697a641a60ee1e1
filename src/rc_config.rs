use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const RC_FILENAME: &str = ".samlreaderrc";

/// Defaults loaded from a `.samlreaderrc` TOML file.
///
/// Looked up first in the working directory, then in `$HOME`.
/// CLI flags always take precedence over file values.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RcConfig {
    pub input_type: Option<String>,
    pub json: Option<bool>,
    pub no_color: Option<bool>,
    pub verbose: Option<u8>,
}

impl RcConfig {
    /// Load `.samlreaderrc` from `dir`, falling back to `$HOME`.
    ///
    /// A file that exists but does not parse is an error; a missing file is not.
    pub fn load(dir: &Path) -> Result<Self> {
        let candidates = [Some(dir.join(RC_FILENAME)), dirs_home().map(|h| h.join(RC_FILENAME))];

        for candidate in candidates.iter().flatten() {
            if !candidate.is_file() {
                continue;
            }
            let contents = std::fs::read_to_string(candidate)
                .with_context(|| format!("Failed to read {}", candidate.display()))?;
            return toml::from_str::<RcConfig>(&contents)
                .with_context(|| format!("Invalid config file {}", candidate.display()));
        }

        Ok(RcConfig::default())
    }
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

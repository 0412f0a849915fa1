//! Configuration loading from dexcount.toml and the user config directory.
//!
//! Precedence, lowest first: `<config dir>/dexcount/config.toml`,
//! `./dexcount.toml`, then whatever the caller sets explicitly (CLI flags).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{DexcountError, DexcountResult, IoResultExt};

const APP_DIR: &str = "dexcount";
const PROJECT_CONFIG: &str = "dexcount.toml";
const USER_CONFIG: &str = "config.toml";

/// Main configuration structure for dexcount.toml.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct DexcountConfig {
    /// Explicit path to the `dx` executable.
    pub dx_path: Option<PathBuf>,
    /// Android SDK root; `$ANDROID_HOME` when unset.
    pub android_home: Option<PathBuf>,
    /// Helper Gradle project used to resolve dependencies.
    pub gradle_dir: Option<PathBuf>,
    /// Root for extracted artifacts; the user config directory when unset.
    pub cache_dir: Option<PathBuf>,
    /// Upper bound on concurrent counting jobs.
    pub max_jobs: Option<usize>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl DexcountConfig {
    /// Layers `other` on top of `self`; set fields in `other` win.
    pub fn merge(self, other: DexcountConfig) -> DexcountConfig {
        DexcountConfig {
            dx_path: other.dx_path.or(self.dx_path),
            android_home: other.android_home.or(self.android_home),
            gradle_dir: other.gradle_dir.or(self.gradle_dir),
            cache_dir: other.cache_dir.or(self.cache_dir),
            max_jobs: other.max_jobs.or(self.max_jobs),
            output: other.output.or(self.output),
        }
    }

    /// Whether JSON output was requested.
    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }

    /// A named subdirectory of the cache root, created if missing.
    pub fn cache_subdir(&self, name: &str) -> DexcountResult<PathBuf> {
        match &self.cache_dir {
            Some(root) => ensure_dir(root.join(name)),
            None => config_dir(name),
        }
    }
}

/// Gets `<user config dir>/dexcount/<name>`, creating it and any parents.
pub fn config_dir(name: &str) -> DexcountResult<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| DexcountError::config("Unable to resolve user config directory"))?;
    ensure_dir(base.join(APP_DIR).join(name))
}

fn ensure_dir(dir: PathBuf) -> DexcountResult<PathBuf> {
    if !dir.is_dir() {
        fs::create_dir_all(&dir).with_path(&dir)?;
    }
    Ok(dir)
}

fn read_config(path: &Path) -> Result<Option<DexcountConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg = toml::from_str(&content)
        .with_context(|| format!("Invalid {}", path.display()))?;
    Ok(Some(cfg))
}

/// Loads dexcount.toml from `dir` if it exists.
pub fn load_config(dir: &Path) -> Result<Option<DexcountConfig>> {
    read_config(&dir.join(PROJECT_CONFIG))
}

/// Loads the per-user configuration if it exists.
pub fn load_user_config() -> Result<Option<DexcountConfig>> {
    let Some(base) = dirs::config_dir() else {
        return Ok(None);
    };
    read_config(&base.join(APP_DIR).join(USER_CONFIG))
}

/// User configuration overlaid with dexcount.toml from `dir`.
pub fn load_effective_config(dir: &Path) -> Result<DexcountConfig> {
    let user = load_user_config()?.unwrap_or_default();
    let project = load_config(dir)?.unwrap_or_default();
    Ok(user.merge(project))
}

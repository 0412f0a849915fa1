//! Builder pattern API for counting a dependency with the default stack.
//!
//! Wires the Gradle resolver and the dx counter from configuration:
//!
//! ```rust,ignore
//! use dexcount_core::prelude::*;
//!
//! let outcome = DexCount::new("com.squareup.okhttp3:okhttp:4.12.0".parse()?)
//!     .dx_path("/opt/android-sdk/build-tools/30.0.3/dx")
//!     .max_jobs(8)
//!     .run(&NoProgress)?;
//!
//! println!("{} methods", outcome.total().methods);
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::DexcountConfig;
use crate::counter::DxCounter;
use crate::dependency::Dependency;
use crate::engine::{CountOutcome, Engine};
use crate::progress::ProgressObserver;
use crate::resolver::GradleResolver;

/// Builder for a single count.
#[derive(Debug, Clone)]
pub struct DexCount {
    /// Dependency to count
    dependency: Dependency,

    /// File/user configuration; explicit setters below override it
    config: DexcountConfig,
}

impl DexCount {
    /// Create a new count builder for the given dependency.
    pub fn new(dependency: Dependency) -> Self {
        Self {
            dependency,
            config: DexcountConfig::default(),
        }
    }

    /// Use `config` as the base configuration.
    pub fn config(mut self, config: DexcountConfig) -> Self {
        self.config = config;
        self
    }

    /// Explicit path to the `dx` executable.
    pub fn dx_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dx_path = Some(path.into());
        self
    }

    /// Explicit helper Gradle project directory.
    pub fn gradle_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.gradle_dir = Some(dir.into());
        self
    }

    /// Root directory for extracted artifacts.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    /// Cap the number of concurrent counting jobs.
    pub fn max_jobs(mut self, jobs: usize) -> Self {
        self.config.max_jobs = Some(jobs);
        self
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    /// Effective configuration the run will use.
    pub fn effective_config(&self) -> &DexcountConfig {
        &self.config
    }

    /// Locate the tools and run the count.
    ///
    /// Setup and resolution failures are returned as errors. Per-dependency
    /// counting failures come back inside the [`CountOutcome`].
    pub fn run(&self, observer: &dyn ProgressObserver) -> Result<CountOutcome> {
        let counter = DxCounter::locate(&self.config).context("Failed to set up dx")?;
        let resolver =
            GradleResolver::locate(&self.config).context("Failed to set up Gradle resolver")?;

        let mut engine = Engine::new(resolver, counter);
        if let Some(jobs) = self.config.max_jobs {
            engine = engine.with_max_jobs(jobs);
        }

        engine
            .count(&self.dependency, observer)
            .with_context(|| format!("Failed to resolve {}", self.dependency))
    }
}

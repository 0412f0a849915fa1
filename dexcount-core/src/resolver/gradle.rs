//! Resolver backed by a helper Gradle project.
//!
//! The helper project declares a `deps` task that resolves `-PinputDep` and
//! prints the resolved artifacts as a pipe-delimited report on stdout.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::{parse_report, Resolver};
use crate::config::{config_dir, DexcountConfig};
use crate::dependency::Dependency;
use crate::error::{DexcountError, DexcountResult};
use crate::tree::CountTree;

const GRADLEW: &str = "gradlew";
/// Checked relative to the working directory, for development checkouts.
const LOCAL_GRADLE_DIR: &str = "gradle";

/// Runs `gradlew deps` in the helper project to resolve a dependency.
#[derive(Debug, Clone)]
pub struct GradleResolver {
    workspace_dir: PathBuf,
}

impl GradleResolver {
    /// Uses `workspace_dir` as the helper project; it must contain `gradlew`.
    pub fn new(workspace_dir: impl Into<PathBuf>) -> DexcountResult<Self> {
        let workspace_dir = workspace_dir.into();
        if !workspace_dir.join(GRADLEW).is_file() {
            return Err(DexcountError::resolution(format!(
                "No {} in Gradle helper project {}",
                GRADLEW,
                workspace_dir.display()
            )));
        }
        Ok(Self { workspace_dir })
    }

    /// Finds the helper project.
    ///
    /// Search order:
    /// 1. `gradle_dir` from configuration
    /// 2. `./gradle` in the working directory
    /// 3. `<user config dir>/dexcount/gradle`
    pub fn locate(config: &DexcountConfig) -> DexcountResult<Self> {
        if let Some(dir) = &config.gradle_dir {
            return Self::new(dir);
        }

        let local = Path::new(LOCAL_GRADLE_DIR);
        if local.join(GRADLEW).is_file() {
            debug!("using local gradle helper project");
            return Self::new(local);
        }

        Self::new(config_dir(LOCAL_GRADLE_DIR)?)
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    fn command(&self, dependency: &Dependency) -> Command {
        let mut cmd = Command::new(self.workspace_dir.join(GRADLEW));
        cmd.arg("-p")
            .arg(&self.workspace_dir)
            .arg("-q")
            .arg("deps")
            .arg(format!("-PinputDep={}", dependency));
        cmd
    }
}

impl Resolver for GradleResolver {
    fn resolve(&self, dependency: &Dependency) -> DexcountResult<CountTree> {
        info!(dependency = %dependency, "resolving transitive dependencies");

        let output = self.command(dependency).output().map_err(|e| {
            DexcountError::resolution(format!(
                "failed to run gradle in {}: {}",
                self.workspace_dir.display(),
                e
            ))
        })?;

        if !output.status.success() {
            return Err(DexcountError::resolution(format!(
                "gradle {} resolving {}: {}",
                output.status,
                dependency,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let report = String::from_utf8_lossy(&output.stdout);
        let tree = parse_report(&report).map_err(|e| {
            DexcountError::resolution(format!("unusable gradle report for {}: {}", dependency, e))
        })?;

        debug!(
            dependency = %dependency,
            unique = tree.unique_count(),
            "resolved"
        );
        Ok(tree)
    }
}

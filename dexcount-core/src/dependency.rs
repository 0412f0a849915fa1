//! Dependency identity: `group:artifact:version`.

use std::fmt;
use std::str::FromStr;

use crate::error::{DexcountError, DexcountResult};

/// Identifies a library by its Maven coordinates.
///
/// Equality, hashing and ordering are structural over all three parts, which
/// makes `Dependency` the deduplication key for a count tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dependency {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Dependency {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Parses `group:artifact:version`.
    ///
    /// Exactly two `:` separators are required. The parts themselves are not
    /// validated, so `::` parses into three empty strings.
    pub fn parse(s: &str) -> DexcountResult<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version] => Ok(Self::new(*group, *artifact, *version)),
            _ => Err(DexcountError::format(format!(
                "Invalid dependency format: expected group:artifact:version, got `{}`",
                s
            ))),
        }
    }

    /// File-name friendly form, used to key extracted artifacts on disk.
    pub fn cache_file_stem(&self) -> String {
        self.to_string().replace(':', "-")
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl FromStr for Dependency {
    type Err = DexcountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

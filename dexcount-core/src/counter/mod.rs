//! Per-artifact method/field counting.
//!
//! The engine never knows which concrete counter it talks to; it only
//! classifies a resolved location into an [`Artifact`] and hands it to a
//! [`Counter`].

mod aar;
mod dex_header;
#[cfg(feature = "dx")]
mod dx;

pub use aar::extract_classes_jar;
pub use dex_header::{decode_dex_header, DEX_HEADER_MIN_LEN};
#[cfg(feature = "dx")]
pub use dx::{find_dx_in_android_home, pick_dx_path, DxCounter};

use std::path::{Path, PathBuf};

use crate::dependency::Dependency;
use crate::error::DexcountResult;
use crate::totals::OwnCounts;

/// Artifact packaging understood by counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Plain jar of class files
    Jar,
    /// Android library bundle; classes live in an inner `classes.jar`
    Aar,
}

/// A resolved, countable artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

impl Artifact {
    /// Classifies a resolver location by extension.
    ///
    /// Returns `None` for anything that is not a `.jar` or `.aar`.
    pub fn classify(location: &str) -> Option<Self> {
        let kind = if location.ends_with(".jar") {
            ArtifactKind::Jar
        } else if location.ends_with(".aar") {
            ArtifactKind::Aar
        } else {
            return None;
        };

        Some(Self {
            kind,
            path: PathBuf::from(location),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Counts the methods and fields one artifact contributes to a dex file.
pub trait Counter: Send + Sync {
    fn count_one(&self, dependency: &Dependency, artifact: &Artifact)
        -> DexcountResult<OwnCounts>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_jar() {
        let artifact = Artifact::classify("/m2/okio/okio-3.6.0.jar").unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Jar);
        assert_eq!(artifact.path(), Path::new("/m2/okio/okio-3.6.0.jar"));
    }

    #[test]
    fn test_classify_aar() {
        let artifact = Artifact::classify("/gradle/caches/core-1.12.0.aar").unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Aar);
    }

    #[test]
    fn test_classify_unknown() {
        assert!(Artifact::classify("/libs/native.so").is_none());
        assert!(Artifact::classify("").is_none());
        assert!(Artifact::classify("/libs/jar").is_none());
    }
}

//! Transitive dependency resolution.
//!
//! A [`Resolver`] turns a root dependency into an uncounted [`CountTree`].
//! The bundled implementation drives a helper Gradle project whose `deps`
//! task prints one pipe-delimited record per dependency; [`parse_report`]
//! turns that report into a tree.

#[cfg(feature = "gradle")]
mod gradle;

#[cfg(feature = "gradle")]
pub use gradle::GradleResolver;

use crate::dependency::Dependency;
use crate::error::{DexcountError, DexcountResult};
use crate::tree::CountTree;

/// Produces the dependency tree of a root dependency, counts left at zero.
pub trait Resolver: Send + Sync {
    fn resolve(&self, dependency: &Dependency) -> DexcountResult<CountTree>;
}

/// Parses a `group|artifact|version|location` report.
///
/// The first record is the root; every later record becomes a direct
/// dependent of it, whatever its real depth. Parsing stops at the first
/// blank line.
pub fn parse_report(report: &str) -> DexcountResult<CountTree> {
    let mut lines = report
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .take_while(|line| !line.is_empty())
        .enumerate();

    let Some((_, first)) = lines.next() else {
        return Err(DexcountError::resolution("resolver report is empty"));
    };

    let (root, location) = parse_record(first, 1)?;
    let mut tree = CountTree::new(root, location);
    let root = tree.root();

    for (index, line) in lines {
        let (dependency, location) = parse_record(line, index + 1)?;
        tree.add_child(root, dependency, location);
    }

    Ok(tree)
}

fn parse_record(line: &str, line_no: usize) -> DexcountResult<(Dependency, &str)> {
    let parts: Vec<&str> = line.split('|').collect();
    match parts.as_slice() {
        [group, artifact, version, location] => {
            Ok((Dependency::new(*group, *artifact, *version), *location))
        }
        _ => Err(DexcountError::format(format!(
            "report line {}: expected group|artifact|version|location, got `{}`",
            line_no, line
        ))),
    }
}

//! Extraction of `classes.jar` from `.aar` bundles.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{DexcountError, DexcountResult, IoResultExt};

const CLASSES_JAR: &str = "classes.jar";

/// Copies the `classes.jar` inside `aar` to `dest`.
///
/// Returns `false` when the bundle has no classes (resources-only aar).
/// An existing `dest` is reused without opening the bundle.
pub fn extract_classes_jar(aar: &Path, dest: &Path) -> DexcountResult<bool> {
    if dest.exists() {
        debug!(jar = %dest.display(), "reusing extracted classes.jar");
        return Ok(true);
    }

    let file = File::open(aar).with_path(aar)?;
    let mut archive = ZipArchive::new(file).map_err(|e| zip_error(aar, e))?;

    let mut entry = match archive.by_name(CLASSES_JAR) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            debug!(aar = %aar.display(), "no classes.jar; resources-only aar");
            return Ok(false);
        }
        Err(e) => return Err(zip_error(aar, e)),
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }

    // `dest` only ever holds a complete jar; later runs reuse it as is.
    let partial = dest.with_extension("jar.part");
    let mut out = File::create(&partial).with_path(&partial)?;
    io::copy(&mut entry, &mut out).with_path(&partial)?;
    drop(out);
    fs::rename(&partial, dest).with_path(dest)?;

    Ok(true)
}

fn zip_error(aar: &Path, err: ZipError) -> DexcountError {
    DexcountError::tool("zip", format!("{}: {}", aar.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("dexcount_aar_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_aar(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extracts_classes_jar() {
        let dir = create_temp_dir("extract");
        let aar = dir.join("lib.aar");
        write_aar(
            &aar,
            &[
                ("AndroidManifest.xml", &b"<manifest/>"[..]),
                ("classes.jar", &b"PK-fake-jar"[..]),
            ],
        );

        let dest = dir.join("aars/com.example-lib-1.0.jar");
        assert!(extract_classes_jar(&aar, &dest).unwrap());
        assert_eq!(fs::read(&dest).unwrap(), b"PK-fake-jar");
        assert!(!dest.with_extension("jar.part").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resources_only_aar() {
        let dir = create_temp_dir("resources");
        let aar = dir.join("res.aar");
        write_aar(&aar, &[("res/values/strings.xml", &b"<resources/>"[..])]);

        let dest = dir.join("res.jar");
        assert!(!extract_classes_jar(&aar, &dest).unwrap());
        assert!(!dest.exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_existing_destination_is_reused() {
        let dir = create_temp_dir("reuse");
        let dest = dir.join("cached.jar");
        fs::write(&dest, b"cached").unwrap();

        // the aar does not even exist; the cached jar short-circuits
        assert!(extract_classes_jar(&dir.join("missing.aar"), &dest).unwrap());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_not_a_zip_is_error() {
        let dir = create_temp_dir("garbage");
        let aar = dir.join("broken.aar");
        fs::write(&aar, b"definitely not a zip").unwrap();

        let err = extract_classes_jar(&aar, &dir.join("out.jar")).unwrap_err();
        assert!(matches!(err, DexcountError::Tool { .. }));

        fs::remove_dir_all(&dir).ok();
    }
}

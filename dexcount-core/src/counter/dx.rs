//! Counter backed by the Android SDK `dx` tool.
//!
//! `dx --dex --output=- <jar>` writes a dex file to stdout; the counts come
//! straight from its header. Some libraries ship `java.*`/`javax.*` classes
//! and are rejected unless `--core-library` is passed, so a failed run is
//! retried once with that flag.

use std::cmp::Ordering;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;
use walkdir::WalkDir;

use super::{decode_dex_header, extract_classes_jar, Artifact, ArtifactKind, Counter};
use crate::config::DexcountConfig;
use crate::dependency::Dependency;
use crate::error::{DexcountError, DexcountResult};
use crate::totals::OwnCounts;

const DX: &str = "dx";

/// Counts jars (and the classes inside aars) by dexing them with `dx`.
#[derive(Debug, Clone)]
pub struct DxCounter {
    dx_path: PathBuf,
    aar_cache: PathBuf,
}

impl DxCounter {
    /// `aar_cache` receives the `classes.jar` extracted from each aar.
    pub fn new(dx_path: impl Into<PathBuf>, aar_cache: impl Into<PathBuf>) -> Self {
        Self {
            dx_path: dx_path.into(),
            aar_cache: aar_cache.into(),
        }
    }

    /// Builds a counter from configuration, falling back to `$ANDROID_HOME`.
    pub fn locate(config: &DexcountConfig) -> DexcountResult<Self> {
        let android_home = config
            .android_home
            .clone()
            .or_else(|| env::var_os("ANDROID_HOME").map(PathBuf::from));
        let dx = pick_dx_path(config.dx_path.as_deref(), android_home.as_deref())?;
        let aar_cache = config.cache_subdir("aars")?;
        debug!(dx = %dx.display(), cache = %aar_cache.display(), "using dx");
        Ok(Self::new(dx, aar_cache))
    }

    pub fn dx_path(&self) -> &Path {
        &self.dx_path
    }

    fn check_jar(&self, jar: &Path) -> DexcountResult<OwnCounts> {
        let dex = match self.run_dx(jar, false) {
            Ok(dex) => dex,
            Err(first) => {
                debug!(jar = %jar.display(), error = %first, "retrying dx with --core-library");
                self.run_dx(jar, true)?
            }
        };
        decode_dex_header(&dex)
    }

    fn run_dx(&self, jar: &Path, core_library: bool) -> DexcountResult<Vec<u8>> {
        let mut cmd = Command::new(&self.dx_path);
        cmd.arg("--dex");
        if core_library {
            cmd.arg("--core-library");
        }
        cmd.arg("--output=-").arg(jar);

        let output = cmd.output().map_err(|e| {
            DexcountError::tool(DX, format!("failed to run {}: {}", self.dx_path.display(), e))
        })?;

        if !output.status.success() {
            return Err(DexcountError::tool(
                DX,
                format!(
                    "{} on {}: {}",
                    output.status,
                    jar.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        Ok(output.stdout)
    }
}

impl Counter for DxCounter {
    fn count_one(
        &self,
        dependency: &Dependency,
        artifact: &Artifact,
    ) -> DexcountResult<OwnCounts> {
        match artifact.kind {
            ArtifactKind::Jar => self.check_jar(&artifact.path),
            ArtifactKind::Aar => {
                let jar = self
                    .aar_cache
                    .join(format!("{}.jar", dependency.cache_file_stem()));
                if extract_classes_jar(&artifact.path, &jar)? {
                    self.check_jar(&jar)
                } else {
                    Ok(OwnCounts::default())
                }
            }
        }
    }
}

/// Picks the `dx` executable: an explicit path, else the newest build-tools.
pub fn pick_dx_path(
    configured: Option<&Path>,
    android_home: Option<&Path>,
) -> DexcountResult<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(DexcountError::config(format!(
            "Provided dx path is invalid: {}",
            path.display()
        )));
    }

    android_home
        .and_then(find_dx_in_android_home)
        .ok_or_else(|| DexcountError::config("Unable to locate `dx`; pass --dx or set ANDROID_HOME"))
}

/// Finds `build-tools/<version>/dx` under an SDK root, newest version first.
pub fn find_dx_in_android_home(home: &Path) -> Option<PathBuf> {
    WalkDir::new(home.join("build-tools"))
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == DX)
        .map(|e| e.into_path())
        .max_by(|a, b| compare_versions(build_tools_version(a), build_tools_version(b)))
}

fn build_tools_version(dx: &Path) -> &str {
    dx.parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .unwrap_or_default()
}

/// Numeric comparison so that `30.0.3` beats `9.0.0`.
fn compare_versions(a: &str, b: &str) -> Ordering {
    fn key(v: &str) -> Vec<u64> {
        v.split(['.', '-'])
            .map(|part| {
                let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect()
    }
    key(a).cmp(&key(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, AtomicOrdering::SeqCst);
        let dir = std::env::temp_dir()
            .join("dexcount_dx_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn fake_dex(methods: u32, fields: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; 112];
        bytes[..4].copy_from_slice(b"dex\n");
        bytes[80..84].copy_from_slice(&fields.to_le_bytes());
        bytes[88..92].copy_from_slice(&methods.to_le_bytes());
        bytes
    }

    #[test]
    fn test_compare_versions_numeric() {
        assert_eq!(compare_versions("30.0.3", "9.0.0"), Ordering::Greater);
        assert_eq!(compare_versions("28.0.3", "28.0.10"), Ordering::Less);
        assert_eq!(compare_versions("29.0.0-rc1", "29.0.0-rc1"), Ordering::Equal);
    }

    #[test]
    fn test_find_dx_picks_newest_build_tools() {
        let home = create_temp_dir("sdk");
        for version in ["9.0.0", "30.0.3", "28.0.3"] {
            let dir = home.join("build-tools").join(version);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("dx"), "").unwrap();
        }
        fs::create_dir_all(home.join("build-tools/31.0.0")).unwrap(); // d8-only, no dx

        let dx = find_dx_in_android_home(&home).unwrap();
        assert_eq!(dx, home.join("build-tools/30.0.3/dx"));

        fs::remove_dir_all(&home).ok();
    }

    #[test]
    fn test_pick_dx_path_rejects_missing_configured_path() {
        let err = pick_dx_path(Some(Path::new("/nonexistent/dx")), None).unwrap_err();
        assert!(matches!(err, DexcountError::Config { .. }));
    }

    #[test]
    fn test_pick_dx_path_without_sources() {
        let err = pick_dx_path(None, None).unwrap_err();
        assert!(err.to_string().contains("Unable to locate"));
    }

    #[cfg(unix)]
    fn write_script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_count_jar_with_fake_dx() {
        let dir = create_temp_dir("jar");
        let dex = dir.join("out.dex");
        fs::write(&dex, fake_dex(1234, 56)).unwrap();
        let dx = dir.join("dx");
        write_script(&dx, &format!("cat '{}'", dex.display()));

        let counter = DxCounter::new(&dx, dir.join("aars"));
        let dep = Dependency::new("com.example", "lib", "1.0");
        let artifact = Artifact::classify("/repo/lib-1.0.jar").unwrap();
        let counts = counter.count_one(&dep, &artifact).unwrap();
        assert_eq!(counts, OwnCounts { methods: 1234, fields: 56 });

        fs::remove_dir_all(&dir).ok();
    }

    fn write_aar(path: &Path, entries: &[(&str, &[u8])]) {
        use std::io::Write;
        use zip::write::FileOptions;

        let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_resources_only_aar_counts_zero() {
        let dir = create_temp_dir("res_aar");
        let aar = dir.join("res-1.aar");
        write_aar(&aar, &[("res/values/strings.xml", &b"<resources/>"[..])]);

        // dx is never invoked for an aar without classes
        let counter = DxCounter::new(dir.join("no-such-dx"), dir.join("aars"));
        let dep = Dependency::new("g", "res", "1");
        let artifact = Artifact::classify(aar.to_str().unwrap()).unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Aar);

        let counts = counter.count_one(&dep, &artifact).unwrap();
        assert_eq!(counts, OwnCounts::default());
        assert!(!dir.join("aars/g-res-1.jar").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[test]
    fn test_count_aar_extracts_then_dexes() {
        let dir = create_temp_dir("aar");
        let aar = dir.join("lib-1.aar");
        write_aar(
            &aar,
            &[
                ("AndroidManifest.xml", &b"<manifest/>"[..]),
                ("classes.jar", &b"PK-classes"[..]),
            ],
        );
        let dex = dir.join("out.dex");
        fs::write(&dex, fake_dex(9, 5)).unwrap();
        let dx = dir.join("dx");
        // only succeeds when handed the extracted jar
        write_script(
            &dx,
            &format!(
                "case \"$*\" in *g-lib-1.jar) cat '{}' ;; *) exit 1 ;; esac",
                dex.display()
            ),
        );

        let counter = DxCounter::new(&dx, dir.join("aars"));
        let dep = Dependency::new("g", "lib", "1");
        let artifact = Artifact::classify(aar.to_str().unwrap()).unwrap();
        let counts = counter.count_one(&dep, &artifact).unwrap();

        assert_eq!(counts, OwnCounts { methods: 9, fields: 5 });
        let cached = dir.join("aars/g-lib-1.jar");
        assert_eq!(fs::read(&cached).unwrap(), b"PK-classes");

        fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[test]
    fn test_retries_with_core_library() {
        let dir = create_temp_dir("retry");
        let dex = dir.join("out.dex");
        fs::write(&dex, fake_dex(7, 3)).unwrap();
        let dx = dir.join("dx");
        write_script(
            &dx,
            &format!(
                "case \"$*\" in *--core-library*) cat '{}' ;; *) echo 'use --core-library' >&2; exit 2 ;; esac",
                dex.display()
            ),
        );

        let counter = DxCounter::new(&dx, dir.join("aars"));
        let counts = counter.check_jar(Path::new("/repo/javax.jar")).unwrap();
        assert_eq!(counts, OwnCounts { methods: 7, fields: 3 });

        fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[test]
    fn test_dx_failure_is_tool_error_with_stderr() {
        let dir = create_temp_dir("fail");
        let dx = dir.join("dx");
        write_script(&dx, "echo 'bad class file' >&2; exit 1");

        let counter = DxCounter::new(&dx, dir.join("aars"));
        let err = counter.check_jar(Path::new("/repo/broken.jar")).unwrap_err();
        assert!(matches!(err, DexcountError::Tool { .. }));
        assert!(err.to_string().contains("bad class file"));

        fs::remove_dir_all(&dir).ok();
    }
}

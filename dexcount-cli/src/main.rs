//! dexcount CLI - count the dex methods and fields a dependency brings in.
//!
//! Features:
//! - Gradle-backed transitive resolution
//! - Parallel, deduplicated counting with `dx`
//! - Live progress on stderr, plain or JSON report on stdout
//!
//! Exit codes: 0 when every dependency was counted, 1 when some failed (the
//! partial report is still printed), 2 on setup or resolution errors.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

use dexcount_core::{
    init_structured_logging, load_effective_config, log_error, log_info, log_warn, print_json,
    print_plain, CountNode, CountTree, Dependency, DexCount, DexcountConfig, DexcountError,
    Progress, ProgressObserver,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Count the dex methods and fields a dependency adds to an Android app"
)]
pub struct Cli {
    /// Dependency to count, as group:artifact:version
    dependency: String,

    /// Path to the dx executable; required if $ANDROID_HOME is not set
    #[arg(long, value_name = "PATH")]
    dx: Option<PathBuf>,

    /// Helper Gradle project used to resolve dependencies
    #[arg(long, value_name = "DIR")]
    gradle_dir: Option<PathBuf>,

    /// Directory for extracted artifacts (defaults to the user config dir)
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Maximum number of dependencies counted at once
    #[arg(long, short = 'j', value_name = "N")]
    jobs: Option<usize>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Do not print progress to stderr
    #[arg(long, short)]
    quiet: bool,
}

const CLEAR_LINE: &str = "\r\x1b[2K";

#[derive(Debug, Default)]
struct ProgressLine {
    total: usize,
    done: usize,
}

/// Rewrites a single status line on stderr.
struct TerminalProgress {
    enabled: bool,
    line: Mutex<ProgressLine>,
}

impl TerminalProgress {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            line: Mutex::new(ProgressLine::default()),
        }
    }

    fn show(&self, status: &str) {
        if !self.enabled {
            return;
        }
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "{}{}", CLEAR_LINE, status);
        let _ = err.flush();
    }
}

fn counting_status(done: usize, total: usize) -> String {
    format!("Counting {} / {}...", done, total)
}

impl ProgressObserver for TerminalProgress {
    fn on_start_resolve(&self, _dependency: &Dependency) {
        self.show("Computing transitive dependencies...");
    }

    fn on_resolved(&self, tree: &CountTree) {
        let mut line = self.line.lock().unwrap_or_else(|e| e.into_inner());
        line.total = tree.unique_count();
        self.show(&counting_status(0, line.total));
    }

    fn on_node_counted(&self, _node: &CountNode, progress: Progress) {
        let mut line = self.line.lock().unwrap_or_else(|e| e.into_inner());
        // completions arrive unordered; never move the counter backwards
        line.done = line.done.max(progress.completed);
        self.show(&counting_status(line.done, progress.total));
    }

    fn on_done(&self, _tree: &CountTree) {
        self.show("");
    }

    fn on_error(&self, _error: &DexcountError) {
        self.show("");
    }
}

/// File configuration overlaid with command-line flags.
fn effective_config(cli: &Cli, base: DexcountConfig) -> DexcountConfig {
    base.merge(DexcountConfig {
        dx_path: cli.dx.clone(),
        gradle_dir: cli.gradle_dir.clone(),
        cache_dir: cli.cache_dir.clone(),
        max_jobs: cli.jobs,
        ..Default::default()
    })
}

fn run(cli: &Cli) -> Result<i32> {
    let dependency: Dependency = cli
        .dependency
        .parse()
        .with_context(|| format!("Invalid dependency `{}`", cli.dependency))?;

    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let config = effective_config(cli, load_effective_config(&cwd)?);
    let json = cli.json || config.wants_json();
    debug!(dependency = %dependency, json, "starting count");

    let progress = TerminalProgress::new(!cli.quiet);
    let outcome = DexCount::new(dependency).config(config).run(&progress)?;

    if json {
        print_json(&outcome);
    } else {
        print_plain(&outcome.tree);
    }

    match &outcome.error {
        None => {
            log_info(&format!("counted {} dependencies", outcome.tree.unique_count()));
            Ok(0)
        }
        Some(err) => {
            log_warn(&format!("{} dependencies failed: {}", outcome.failed, err));
            eprintln!(
                "\nIncomplete: {} of {} dependencies could not be counted; first error: {}",
                outcome.failed,
                outcome.tree.unique_count(),
                err
            );
            Ok(1)
        }
    }
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("{}[PANIC] dexcount internal error: {}", CLEAR_LINE, info);
        eprintln!("[PANIC] The process will exit with code 2.");
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            log_error(&format!("{:#}", err));
            eprintln!("{}Error: {:#}", CLEAR_LINE, err);
            2
        }
    };
    std::process::exit(code);
}

//! dexcount-core: dex method and field counting for Android dependencies
//!
//! Given a `group:artifact:version`, this library resolves the transitive
//! closure, deduplicates dependencies shared by several parents, counts the
//! methods and fields each unique dependency adds to a dex file (in
//! parallel, exactly once each) and aggregates the totals.
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use dexcount_core::prelude::*;
//!
//! let outcome = DexCount::new("com.squareup.retrofit2:retrofit:2.9.0".parse()?)
//!     .run(&NoProgress)?;
//!
//! print_plain(&outcome.tree);
//! ```
//!
//! # Module Organization
//!
//! - [`dependency`]: `group:artifact:version` identity
//! - [`tree`]: count records shared across tree positions
//! - [`flatten`]: deduplication of a tree into unique dependencies
//! - [`totals`]: aggregation over the deduplicated set
//! - [`engine`]: resolve, fan out counting, join
//! - [`resolver`]: resolver trait, report parsing, Gradle resolver
//! - [`counter`]: counter trait, dex header decoding, aar extraction, dx counter
//! - [`progress`]: progress observer
//! - [`report`]: plain and JSON output
//! - [`builder`]: fluent API wiring the default stack
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `dx` (default): `dx`-backed counter
//! - `gradle` (default): Gradle-backed resolver
//! - `full`: Enable all optional features

// Core modules (always available)
pub mod config;
pub mod counter;
pub mod dependency;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod logging;
pub mod prelude;
pub mod progress;
pub mod report;
pub mod resolver;
pub mod totals;
pub mod tree;

// Feature-gated modules
#[cfg(all(feature = "dx", feature = "gradle"))]
pub mod builder;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{DexcountError, DexcountResult, IoResultExt};

// Data model
pub use dependency::Dependency;
pub use tree::{CountNode, CountTree, NodeId, Position};

// Deduplication and aggregation
pub use flatten::flatten;
pub use totals::{calculate_total, OwnCounts, TotalCounts};

// Orchestration
pub use engine::{CountOutcome, Engine};
pub use progress::{NoProgress, Progress, ProgressObserver};

// Collaborators
pub use counter::{
    decode_dex_header, extract_classes_jar, Artifact, ArtifactKind, Counter, DEX_HEADER_MIN_LEN,
};
pub use resolver::{parse_report, Resolver};

// Configuration
pub use config::{
    config_dir, load_config, load_effective_config, load_user_config, DexcountConfig,
    OutputConfig,
};

// Logging
pub use logging::{init_structured_logging, log_error, log_info, log_warn};

// Reporting
pub use report::{print_json, print_plain, render_json, render_plain};

// Feature-gated re-exports
#[cfg(feature = "dx")]
pub use counter::{find_dx_in_android_home, pick_dx_path, DxCounter};

#[cfg(feature = "gradle")]
pub use resolver::GradleResolver;

#[cfg(all(feature = "dx", feature = "gradle"))]
pub use builder::DexCount;

//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use dexcount_core::prelude::*;
//! ```

// Core types
pub use crate::dependency::Dependency;
pub use crate::error::{DexcountError, DexcountResult};
pub use crate::tree::{CountNode, CountTree};
pub use crate::totals::{OwnCounts, TotalCounts};

// Orchestration
pub use crate::engine::{CountOutcome, Engine};
pub use crate::progress::{NoProgress, Progress, ProgressObserver};

// Collaborator traits
pub use crate::counter::{Artifact, Counter};
pub use crate::resolver::Resolver;

// Configuration
pub use crate::config::{load_effective_config, DexcountConfig};

// Reporting
pub use crate::report::{print_json, print_plain};

// Builder API
#[cfg(all(feature = "dx", feature = "gradle"))]
pub use crate::builder::DexCount;

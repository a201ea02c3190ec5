//! `sidebar_core` is the engine behind `sidebarupdater`. It keeps a long-lived
//! shared document (a subreddit sidebar) fresh by regenerating
//! marker-delimited regions with small plugins and publishing the result
//! only when it changed.
//!
//! ## Processing Pipeline
//!
//! ```text
//! DocumentStore::read
//!   → for each configured region, in declaration order:
//!       locate (first start marker → first end marker after it)
//!       → PluginRegistry::invoke (failures stay local to the region)
//!       → merge (start marker, body and end marker joined by blank lines)
//!   → compare with the original, log a unified diff, check the size ceiling
//!   → DocumentStore::write with "Automatic update of: ..." (skipped on dry run)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Region configuration loaded from INI files, and the
//!   runtime [`SyncSettings`].
//! - [`plugins`]: The built-in `countdown` and `submissions` plugins.
//!
//! ## Key Types
//!
//! - [`Region`]: A named region with its markers, plugin and parameters.
//! - [`PluginRegistry`]: Maps plugin names to [`Plugin`] implementations.
//! - [`Synchronizer`]: Runs a pass and produces a [`SyncOutcome`].
//! - [`DocumentStore`]: Where the document is read from and published to.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use sidebar_core::FileStore;
//! use sidebar_core::OfflineSession;
//! use sidebar_core::PluginContext;
//! use sidebar_core::PluginRegistry;
//! use sidebar_core::RegionConfig;
//! use sidebar_core::SyncSettings;
//! use sidebar_core::Synchronizer;
//!
//! let config = RegionConfig::load(Path::new("sidebar.ini")).unwrap();
//! let registry = PluginRegistry::with_builtins();
//! let session = OfflineSession::new("example");
//! let ctx = PluginContext {
//! 	subreddit: "nfl",
//! 	now: chrono::Utc::now(),
//! 	session: &session,
//! };
//!
//! let store = FileStore::new("sidebar.md");
//! let outcome = Synchronizer::new(&registry, SyncSettings::default())
//! 	.run(&store, &config, &ctx)
//! 	.unwrap();
//! println!("changed: {:?}", outcome.changed_region_titles);
//! ```

pub use config::*;
pub use diff::*;
pub use error::*;
pub use plugin::*;
pub use region::*;
pub use session::*;
pub use store::*;
pub use sync::*;

pub mod config;
mod diff;
#[allow(unused_assignments)]
mod error;
mod plugin;
pub mod plugins;
mod region;
mod session;
mod store;
mod sync;

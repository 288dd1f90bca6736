//! LoadSync Core Library
//!
//! Load-order synchronization core for mod-management host applications:
//! merges the plugins provided by installed mods into one deterministic
//! load order, hoists master files to the front, and enables or disables
//! each plugin depending on whether its declared masters made it into the
//! final list.
//!
//! # Architecture
//!
//! This library is designed to be consumed via FFI by native host frontends:
//! - **macOS**: SwiftUI app using static lib via Swift ↔ Rust FFI
//! - **Windows**: WPF app using DLL via C# ↔ Rust P/Invoke
//!
//! The host hands in a snapshot of its mod and plugin lists, the core
//! computes the plan, and the host applies it through its own API. The
//! `loadsync` binary drives the same pass from the command line against a
//! manifest file.
//!
//! # Core Features Implemented
//!
//! ## Ordering (`order` module)
//! - `PluginOrdering` - mod priority first, then per-mod name heuristics
//!   that push dependent files ("patch", "fix", "addon") later
//! - Operator exception table for mods with unusual naming
//!
//! ## Synchronization (`sync` module)
//! - `SyncEngine::run()` - sort, hoist masters, push the merged order,
//!   disable plugins with missing masters
//! - `SyncReport` - resulting order, states, and warnings
//!
//! ## Host Integration (`registry`, `host`, `config` modules)
//! - `PluginRegistry` - the collaborator surface a host implements
//! - `ManifestRegistry` - JSON-snapshot registry with plain-text persistence
//! - Host API version negotiation and per-version list dialects
//! - JSON settings with load-time validation of the exception table

pub mod config;
pub mod error;
pub mod ffi;
pub mod host;
pub mod order;
pub mod plugin;
pub mod registry;
pub mod sync;

pub use config::{ExceptionRule, HeuristicSet, SyncSettings};
pub use error::SyncError;
pub use plugin::{PluginInfo, PluginState};
pub use registry::{Manifest, ManifestRegistry, PluginRegistry};
pub use sync::{SyncEngine, SyncReport};

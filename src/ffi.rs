//! FFI (Foreign Function Interface) bindings for cross-language interop.
//!
//! This module exposes the sync core through C-compatible functions that
//! can be called from Swift (macOS) and C# (Windows) host frontends. The
//! host hands in its plugin snapshot as JSON, receives the computed plan,
//! and applies the order and enablement states through its own API.
//!
//! # Memory Management
//!
//! - Rust allocates memory and returns pointers to Swift/C#
//! - The calling code MUST call the corresponding `_free` functions to prevent leaks
//! - Strings are null-terminated UTF-8
//!
//! # Usage from Swift (macOS)
//!
//! ```swift
//! let engine = loadsync_engine_new(settingsJson)
//! defer { loadsync_engine_free(engine) }
//!
//! let plan = loadsync_engine_run(engine, manifestJson)
//! defer { loadsync_plan_free(plan) }
//!
//! let count = loadsync_plan_count(plan)
//! for i in 0..<count {
//!     let name = loadsync_plan_name_at(plan, i)
//!     let enabled = loadsync_plan_is_enabled(plan, i)
//!     // Apply to the host...
//!     loadsync_free_string(name)
//! }
//! ```
//!
//! # Usage from C# (Windows)
//!
//! ```csharp
//! [DllImport("loadsync_core.dll")]
//! private static extern IntPtr loadsync_engine_new(string settingsJson);
//!
//! [DllImport("loadsync_core.dll")]
//! private static extern IntPtr loadsync_engine_run(IntPtr engine, string manifestJson);
//! ```

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use log::error;
use semver::Version;

use crate::config::SyncSettings;
use crate::host::require_host;
use crate::registry::{Manifest, ManifestRegistry};
use crate::sync::{SyncEngine, SyncReport};

// ============================================================================
// C-Compatible Types
// ============================================================================

/// Opaque handle to a configured sync engine
#[repr(C)]
pub struct CSyncEngine {
    engine: SyncEngine,
}

/// Opaque handle to the result of a sync pass
#[repr(C)]
pub struct CSyncPlan {
    report: SyncReport,
}

// ============================================================================
// Version Negotiation
// ============================================================================

/// Check whether a host API version is supported.
/// Returns 1 if supported, 0 if not (or if the version string is invalid).
#[no_mangle]
pub extern "C" fn loadsync_host_supported(version: *const c_char) -> c_int {
    if version.is_null() {
        return 0;
    }
    let raw = unsafe { CStr::from_ptr(version) };
    let raw = match raw.to_str() {
        Ok(s) => s,
        Err(_) => return 0,
    };
    let version = match Version::parse(raw.trim()) {
        Ok(v) => v,
        Err(_) => return 0,
    };
    match require_host(&version) {
        Ok(()) => 1,
        Err(_) => 0,
    }
}

// ============================================================================
// Engine Lifecycle
// ============================================================================

/// Create a sync engine from a JSON settings string.
/// Pass null to use default settings.
/// Returns null if the settings are invalid (e.g. a bad exception pattern).
/// Caller MUST call loadsync_engine_free() when done.
#[no_mangle]
pub extern "C" fn loadsync_engine_new(settings_json: *const c_char) -> *mut CSyncEngine {
    let settings = if settings_json.is_null() {
        SyncSettings::default()
    } else {
        let raw = unsafe { CStr::from_ptr(settings_json) };
        let raw = match raw.to_str() {
            Ok(s) => s,
            Err(_) => return ptr::null_mut(),
        };
        match serde_json::from_str::<SyncSettings>(raw) {
            Ok(settings) => settings,
            Err(e) => {
                error!("Invalid sync settings: {}", e);
                return ptr::null_mut();
            }
        }
    };

    match SyncEngine::new(&settings) {
        Ok(engine) => Box::into_raw(Box::new(CSyncEngine { engine })),
        Err(e) => {
            error!("Failed to build sync engine: {}", e);
            ptr::null_mut()
        }
    }
}

/// Free an engine returned by loadsync_engine_new().
#[no_mangle]
pub extern "C" fn loadsync_engine_free(engine: *mut CSyncEngine) {
    if !engine.is_null() {
        unsafe {
            let _ = Box::from_raw(engine);
        }
    }
}

// ============================================================================
// Running a Sync
// ============================================================================

/// Run a full sync pass over a JSON plugin snapshot.
/// Returns an opaque handle to the computed plan, or null on error
/// (malformed snapshot, unsupported host version, registry failure).
/// Nothing is applied anywhere; the host reads the plan back and applies it.
/// Caller MUST call loadsync_plan_free() when done.
#[no_mangle]
pub extern "C" fn loadsync_engine_run(
    engine: *const CSyncEngine,
    manifest_json: *const c_char,
) -> *mut CSyncPlan {
    if engine.is_null() || manifest_json.is_null() {
        return ptr::null_mut();
    }

    let raw = unsafe { CStr::from_ptr(manifest_json) };
    let raw = match raw.to_str() {
        Ok(s) => s,
        Err(_) => return ptr::null_mut(),
    };
    let manifest = match Manifest::from_json(raw) {
        Ok(manifest) => manifest,
        Err(e) => {
            error!("Rejected plugin snapshot: {:#}", e);
            return ptr::null_mut();
        }
    };
    let mut registry = match ManifestRegistry::new(manifest) {
        Ok(registry) => registry,
        Err(e) => {
            error!("Rejected plugin snapshot: {:#}", e);
            return ptr::null_mut();
        }
    };

    let engine = unsafe { &(*engine).engine };
    match engine.run(&mut registry) {
        Ok(report) => Box::into_raw(Box::new(CSyncPlan { report })),
        Err(e) => {
            error!("Sync failed: {:#}", e);
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Reading the Plan
// ============================================================================

/// Get the number of plugins in the computed load order.
#[no_mangle]
pub extern "C" fn loadsync_plan_count(plan: *const CSyncPlan) -> c_int {
    if plan.is_null() {
        return 0;
    }
    unsafe { (*plan).report.load_order.len() as c_int }
}

/// Get the plugin name at a position in the load order.
/// Returns a null-terminated string, or null if the index is out of range.
/// Caller MUST call loadsync_free_string() when done.
#[no_mangle]
pub extern "C" fn loadsync_plan_name_at(plan: *const CSyncPlan, index: c_int) -> *mut c_char {
    if plan.is_null() {
        return ptr::null_mut();
    }
    unsafe {
        let load_order = &(*plan).report.load_order;
        match load_order.get(index as usize) {
            Some(name) => string_to_c_char(name),
            None => ptr::null_mut(),
        }
    }
}

/// Get the computed enablement for the plugin at a position in the load
/// order. Returns 1 for enabled, 0 for disabled, -1 if out of range.
#[no_mangle]
pub extern "C" fn loadsync_plan_is_enabled(plan: *const CSyncPlan, index: c_int) -> c_int {
    if plan.is_null() {
        return -1;
    }
    unsafe {
        let states = &(*plan).report.states;
        match states.get(index as usize) {
            Some((_, state)) => state.is_active() as c_int,
            None => -1,
        }
    }
}

/// Get the number of missing-master warnings the pass produced.
#[no_mangle]
pub extern "C" fn loadsync_plan_warning_count(plan: *const CSyncPlan) -> c_int {
    if plan.is_null() {
        return 0;
    }
    unsafe { (*plan).report.warnings.len() as c_int }
}

/// Get a warning line by index.
/// Caller MUST call loadsync_free_string() when done.
#[no_mangle]
pub extern "C" fn loadsync_plan_warning_at(plan: *const CSyncPlan, index: c_int) -> *mut c_char {
    if plan.is_null() {
        return ptr::null_mut();
    }
    unsafe {
        let warnings = &(*plan).report.warnings;
        match warnings.get(index as usize) {
            Some(warning) => string_to_c_char(warning),
            None => ptr::null_mut(),
        }
    }
}

/// Free a plan returned by loadsync_engine_run().
#[no_mangle]
pub extern "C" fn loadsync_plan_free(plan: *mut CSyncPlan) {
    if !plan.is_null() {
        unsafe {
            let _ = Box::from_raw(plan);
        }
    }
}

// ============================================================================
// String Management
// ============================================================================

/// Free a string returned by FFI functions.
#[no_mangle]
pub extern "C" fn loadsync_free_string(s: *mut c_char) {
    free_c_char(s);
}

// ============================================================================
// Helper Functions
// ============================================================================

fn string_to_c_char(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn free_c_char(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}

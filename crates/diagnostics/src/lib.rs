// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Structured logging shared by the nodetree crates.
//!
//! Usage:
//! - Set NODETREE_LOG=off (default) - no logs
//! - Set NODETREE_LOG=info - opened trees, completed recursive scans
//! - Set NODETREE_LOG=debug - per-directory scan counts, attach/dispose, drift
//! - Set NODETREE_LOG=warn - only skipped directories and odd archive entries

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

static INIT: Once = Once::new();

/// Environment variable selecting the minimum level
pub const LOG_ENV: &str = "NODETREE_LOG";

/// Map a `NODETREE_LOG` value to a minimum level. `None` disables logging;
/// unknown values fall back to info and are reported as such.
fn parse_level(value: &str) -> (Option<emit::Level>, bool) {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => (None, true),
        "debug" => (Some(emit::Level::Debug), true),
        "info" => (Some(emit::Level::Info), true),
        "warn" => (Some(emit::Level::Warn), true),
        "error" => (Some(emit::Level::Error), true),
        _ => (Some(emit::Level::Info), false),
    }
}

/// Initialize diagnostics based on the `NODETREE_LOG` environment variable
///
/// Call once at startup; later calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_default();
        let (level, known) = parse_level(&value);
        let Some(level) = level else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if !known {
            // Bootstrap warning, shown regardless of level
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Warning: Unknown {LOG_ENV} value '{value}', using 'info'");
            }
        }

        // The runtime must outlive every emitter; it is never torn down.
        std::mem::forget(rt);
    });
}

/// Lifecycle of trees: opened, recursively scanned, closed
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Per-directory scan counts, attach and dispose, healed drift
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Recoverable trouble: unlistable directories, skipped archive entries
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Failures the caller is about to see as an error
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;

//! Process-wide logging setup shared by the tracker binaries.

/// Initialize tracing/logging with JSON output on stderr.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with_default("info");
}

/// Tracing configuration (filters, layers).
pub mod tracing;

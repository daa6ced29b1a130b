//! Tracing/logging setup and the domain event audit log.

pub mod audit;
pub mod tracing;

pub use audit::spawn_audit_log;

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

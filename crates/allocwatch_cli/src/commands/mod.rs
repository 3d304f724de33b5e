//! CLI command handlers.

mod context;
/// Allocation calls at a single revision.
pub mod detail;
/// Allocation-call counts across history.
pub mod series;

/// Convenience alias for command return types.
pub type Result<T = ()> = anyhow::Result<T>;

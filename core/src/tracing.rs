//! Tracing utilities for query composition and retrieval.
//!
//! Enable the `tracing` feature to emit spans and events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// canopy_trace_query!(&sql_str, params.len());
/// ```
#[macro_export]
macro_rules! canopy_trace_query {
    ($sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, params = $param_count, "canopy.query");
    };
}

/// Emit a debug-level event when a composer finishes setup.
///
/// ```ignore
/// canopy_trace_setup!("categories", options.len());
/// ```
#[macro_export]
macro_rules! canopy_trace_setup {
    ($entity:expr, $option_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(entity = %$entity, options = $option_count, "canopy.setup");
    };
}

/// Emit a trace-level event for each option applied to a phase.
#[macro_export]
macro_rules! canopy_trace_phase {
    ($phase:expr, $option:expr) => {
        #[cfg(feature = "tracing")]
        tracing::trace!(phase = ?$phase, option = %$option, "canopy.option");
    };
}

/// Emit a warn-level event with a formatted message.
#[macro_export]
macro_rules! canopy_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::warn!($($arg)*);
    };
}

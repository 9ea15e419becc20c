use crate::events::EventKind;
use crate::windows::WindowId;

/// Sink for soft conditions the session absorbs instead of raising.
///
/// The router and registry report through this trait rather than logging
/// directly, so embedders can count or assert on the conditions. Production
/// code wires [`NullDiagnostics`] unless it cares.
pub trait DiagnosticsSink {
    /// An event kind reached the router with no handler installed.
    fn unhandled_event(&self, _kind: EventKind) {}

    /// An event was dropped because its window is not registered
    /// (already closed, or belongs to another client).
    fn stale_event(&self, _kind: EventKind) {}

    /// `close_window` was called for an id that is not open.
    fn stray_close(&self, _id: WindowId) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagnostics;

impl DiagnosticsSink for NullDiagnostics {}

/// Forwards every report to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn unhandled_event(&self, kind: EventKind) {
        tracing::debug!(?kind, "unhandled event kind");
    }

    fn stale_event(&self, kind: EventKind) {
        tracing::debug!(?kind, "dropped event for unregistered window");
    }

    fn stray_close(&self, id: WindowId) {
        tracing::debug!(window_id = ?id, "close requested for a window that is not open");
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::diag::DiagnosticsSink;
use crate::error::{Result, SessionError};

/// Caller-chosen identifier for a session window. Small, stable, and
/// meaningful only within this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub i32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Native window handle as issued by the display service. Opaque to
/// everything except the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawWindow(pub u32);

impl fmt::Display for RawWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Geometry as reported by the display service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
    pub depth: u8,
}

/// The id ↔ native-handle table.
///
/// Bookkeeping only: the session layers driver side effects on top. The
/// reverse lookup is a linear scan over the values; window counts here are
/// single digits and a second map would just be more state to keep honest.
pub struct WindowRegistry {
    windows: BTreeMap<WindowId, RawWindow>,
    diag: Arc<dyn DiagnosticsSink>,
}

impl WindowRegistry {
    pub fn new(diag: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            windows: BTreeMap::new(),
            diag,
        }
    }

    /// Records `id ↔ raw`. Rejects an already-registered id without
    /// touching the existing entry.
    pub fn insert(&mut self, id: WindowId, raw: RawWindow) -> Result<()> {
        if self.windows.contains_key(&id) {
            return Err(SessionError::DuplicateId(id));
        }
        self.windows.insert(id, raw);
        Ok(())
    }

    /// Removes `id`, returning its handle. A miss is reported to the
    /// diagnostics sink and answered with `None`, never an error.
    pub fn remove(&mut self, id: WindowId) -> Option<RawWindow> {
        let removed = self.windows.remove(&id);
        if removed.is_none() {
            self.diag.stray_close(id);
        }
        removed
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn raw(&self, id: WindowId) -> Option<RawWindow> {
        self.windows.get(&id).copied()
    }

    /// Reverse lookup for event resolution: which of our ids owns this
    /// native handle, if any?
    pub fn raw_to_id(&self, raw: RawWindow) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, handle)| **handle == raw)
            .map(|(id, _)| *id)
    }

    /// Open ids in ascending order.
    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Empties the table for teardown, yielding every pair.
    pub fn drain(&mut self) -> Vec<(WindowId, RawWindow)> {
        std::mem::take(&mut self.windows).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::diag::NullDiagnostics;

    #[derive(Default)]
    struct StrayCounter {
        strays: AtomicUsize,
    }

    impl DiagnosticsSink for StrayCounter {
        fn stray_close(&self, _id: WindowId) {
            self.strays.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn registry() -> WindowRegistry {
        WindowRegistry::new(Arc::new(NullDiagnostics))
    }

    #[test]
    fn insert_rejects_duplicates_without_clobbering() {
        let mut reg = registry();
        reg.insert(WindowId(1), RawWindow(0xa1)).unwrap();
        let err = reg.insert(WindowId(1), RawWindow(0xb2)).unwrap_err();
        assert!(matches!(err, SessionError::DuplicateId(WindowId(1))));
        assert_eq!(reg.raw(WindowId(1)), Some(RawWindow(0xa1)));
    }

    #[test]
    fn reverse_lookup_tracks_membership() {
        let mut reg = registry();
        reg.insert(WindowId(1), RawWindow(0xa1)).unwrap();
        reg.insert(WindowId(2), RawWindow(0xb2)).unwrap();
        assert_eq!(reg.raw_to_id(RawWindow(0xb2)), Some(WindowId(2)));
        assert_eq!(reg.raw_to_id(RawWindow(0xdead)), None);
        reg.remove(WindowId(2));
        assert_eq!(reg.raw_to_id(RawWindow(0xb2)), None);
    }

    #[test]
    fn stray_removal_reports_but_does_not_fail() {
        let counter = Arc::new(StrayCounter::default());
        let mut reg = WindowRegistry::new(counter.clone());
        assert_eq!(reg.remove(WindowId(9)), None);
        assert_eq!(counter.strays.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn drain_empties_in_id_order() {
        let mut reg = registry();
        reg.insert(WindowId(3), RawWindow(3)).unwrap();
        reg.insert(WindowId(1), RawWindow(1)).unwrap();
        let drained = reg.drain();
        assert_eq!(drained, vec![(WindowId(1), RawWindow(1)), (WindowId(3), RawWindow(3))]);
        assert!(reg.is_empty());
    }
}

use std::sync::Arc;

use crate::diag::{DiagnosticsSink, NullDiagnostics};
use crate::drivers::{DisplayDriver, ProtocolAtoms};
use crate::error::{Result, SessionError};
use crate::keys::{KeySym, KeyStateTracker};
use crate::mask::EventMask;
use crate::redraw::RedrawQueue;
use crate::windows::{RawWindow, WindowAttributes, WindowId, WindowRegistry};

/// One display connection plus everything the session tracks on top of it:
/// the window table, keyboard state, and pending redraws.
///
/// All methods run on the caller's thread; the expected shape is the tick
/// loop in [`EventLoop`](crate::event_loop::EventLoop), with an
/// [`EventRouter`](crate::router::EventRouter) draining events into this
/// state between updates.
pub struct Session<D: DisplayDriver> {
    pub(crate) driver: D,
    pub(crate) windows: WindowRegistry,
    pub(crate) keys: KeyStateTracker,
    pub(crate) redraw: RedrawQueue,
    pub(crate) diag: Arc<dyn DiagnosticsSink>,
}

impl<D: DisplayDriver> Session<D> {
    pub fn new(driver: D) -> Self {
        Self::with_diagnostics(driver, Arc::new(NullDiagnostics))
    }

    pub fn with_diagnostics(driver: D, diag: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            driver,
            windows: WindowRegistry::new(Arc::clone(&diag)),
            keys: KeyStateTracker::new(),
            redraw: RedrawQueue::new(),
            diag,
        }
    }

    /// Creates and maps a native window under the caller's `id`.
    ///
    /// The sequence is create, select input, set title, opt into the
    /// close-request handshake, map, flush, and only then record the id.
    /// An id that is already open fails with `DuplicateId` before any
    /// native work happens, leaving the existing window untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn open_window(
        &mut self,
        id: WindowId,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        mask: EventMask,
        title: &str,
    ) -> Result<()> {
        if self.windows.contains(id) {
            return Err(SessionError::DuplicateId(id));
        }
        let raw = self.driver.create_window(x, y, width, height)?;
        self.driver.set_event_mask(raw, mask)?;
        self.driver.set_title(raw, title)?;
        self.driver.register_close_protocol(raw)?;
        self.driver.map_window(raw)?;
        self.driver.flush()?;
        self.windows.insert(id, raw)?;
        tracing::debug!(window_id = ?id, raw = ?raw, title, "opened window");
        Ok(())
    }

    /// Destroys the native window and forgets the id, in that coupled
    /// order: once the entry is gone the window counts as closed even if
    /// the destroy request fails in flight. Unknown ids are a no-op.
    pub fn close_window(&mut self, id: WindowId) -> Result<()> {
        let Some(raw) = self.windows.remove(id) else {
            return Ok(());
        };
        tracing::debug!(window_id = ?id, raw = ?raw, "closed window");
        self.driver.destroy_window(raw)?;
        self.driver.flush()
    }

    pub fn is_open(&self, id: WindowId) -> bool {
        self.windows.contains(id)
    }

    /// Current geometry straight from the display service.
    pub fn attributes(&mut self, id: WindowId) -> Result<WindowAttributes> {
        let raw = self
            .windows
            .raw(id)
            .ok_or(SessionError::UnknownWindow(id))?;
        self.driver.window_geometry(raw)
    }

    /// Which session window owns this native handle, if any.
    pub fn raw_to_id(&self, raw: RawWindow) -> Option<WindowId> {
        self.windows.raw_to_id(raw)
    }

    pub fn raw_window(&self, id: WindowId) -> Option<RawWindow> {
        self.windows.raw(id)
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.ids()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Queues `id` for a repaint in the next flush. No membership check
    /// here; a window closed before the flush is skipped then.
    pub fn schedule_redraw(&mut self, id: WindowId) {
        self.redraw.schedule(id);
    }

    pub fn pending_redraws(&self) -> usize {
        self.redraw.len()
    }

    /// Blanks the window to its background, optionally pushing the
    /// request out immediately.
    pub fn clear_window(&mut self, id: WindowId, flush: bool) -> Result<()> {
        let raw = self
            .windows
            .raw(id)
            .ok_or(SessionError::UnknownWindow(id))?;
        self.driver.clear_window(raw)?;
        if flush {
            self.driver.flush()?;
        }
        Ok(())
    }

    pub fn key_is_down(&self, key: KeySym) -> bool {
        self.keys.is_down(key)
    }

    /// Edge query, consuming. See
    /// [`KeyStateTracker::is_just_pressed`](crate::keys::KeyStateTracker::is_just_pressed).
    pub fn key_just_pressed(&mut self, key: KeySym) -> bool {
        self.keys.is_just_pressed(key)
    }

    pub fn key_state_changed(&self) -> bool {
        self.keys.has_state_changed()
    }

    pub fn keys(&self) -> &KeyStateTracker {
        &self.keys
    }

    /// Mutable tracker access, for handler overrides that take over the
    /// key bookkeeping the defaults would have done.
    pub fn keys_mut(&mut self) -> &mut KeyStateTracker {
        &mut self.keys
    }

    pub fn protocol_atoms(&self) -> ProtocolAtoms {
        self.driver.protocol_atoms()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.driver.flush()
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

impl<D: DisplayDriver> Drop for Session<D> {
    fn drop(&mut self) {
        let survivors = self.windows.drain();
        if survivors.is_empty() {
            return;
        }
        for (id, raw) in survivors {
            tracing::debug!(window_id = ?id, "destroying window at teardown");
            let _ = self.driver.destroy_window(raw);
        }
        let _ = self.driver.flush();
    }
}

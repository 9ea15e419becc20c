use std::collections::BTreeMap;

use crate::drivers::DisplayDriver;
use crate::error::Result;
use crate::events::{DisplayEvent, EventKind};
use crate::session::Session;

/// Handler closure: the session, the application state, and the event.
pub type Handler<D, A> = Box<dyn FnMut(&mut Session<D>, &mut A, &DisplayEvent)>;

/// Routes drained events to per-kind handlers.
///
/// Every kind has a built-in default: key events keep the
/// [`KeyStateTracker`](crate::keys::KeyStateTracker) current, the
/// close-request handshake closes the window it names, exposures resolve
/// their window (and are dropped when it is gone), and everything else is
/// reported to the diagnostics sink as unhandled. Consumers replace a
/// kind's handling wholesale with [`on`](Self::on); an override of
/// `KeyPress`/`KeyRelease` must update the tracker itself (via
/// [`Session::keys_mut`]) or edge detection downstream goes stale.
pub struct EventRouter<D: DisplayDriver, A> {
    overrides: BTreeMap<EventKind, Handler<D, A>>,
}

impl<D: DisplayDriver, A> EventRouter<D, A> {
    pub fn new() -> Self {
        Self {
            overrides: BTreeMap::new(),
        }
    }

    /// Installs `handler` for `kind`, replacing the default (or a
    /// previous override) for that kind.
    pub fn on(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&mut Session<D>, &mut A, &DisplayEvent) + 'static,
    ) -> &mut Self {
        self.overrides.insert(kind, Box::new(handler));
        self
    }

    /// Removes the override for `kind`, restoring the built-in default.
    pub fn reset(&mut self, kind: EventKind) {
        self.overrides.remove(&kind);
    }

    /// Routes one event to its handler.
    pub fn dispatch(&mut self, session: &mut Session<D>, app: &mut A, event: &DisplayEvent) {
        if let Some(handler) = self.overrides.get_mut(&event.kind()) {
            handler(session, app, event);
        } else {
            Self::default_handler(session, event);
        }
    }

    /// Dispatches queued events until the driver reports a momentarily
    /// empty queue. Returns how many events were handled.
    pub fn drain_pending(&mut self, session: &mut Session<D>, app: &mut A) -> Result<usize> {
        let mut handled = 0;
        while let Some(event) = session.driver.poll_event()? {
            self.dispatch(session, app, &event);
            handled += 1;
        }
        Ok(handled)
    }

    /// Works off the redraw queue in FIFO order: each id still open is
    /// cleared and then re-enters the exposure path with a synthetic
    /// event (count 0), so an overridden `Expose` handler repaints it.
    /// Ids whose window closed since scheduling are skipped silently.
    /// Returns how many windows were repainted.
    pub fn flush_redraws(&mut self, session: &mut Session<D>, app: &mut A) -> Result<usize> {
        let mut repainted = 0;
        while let Some(id) = session.redraw.pop() {
            let Some(raw) = session.raw_window(id) else {
                continue;
            };
            session.clear_window(id, false)?;
            let synthetic = DisplayEvent::Expose {
                window: raw,
                x: 0,
                y: 0,
                width: 0,
                height: 0,
                count: 0,
            };
            self.dispatch(session, app, &synthetic);
            repainted += 1;
        }
        if repainted > 0 {
            session.flush()?;
        }
        Ok(repainted)
    }

    fn default_handler(session: &mut Session<D>, event: &DisplayEvent) {
        match event {
            DisplayEvent::KeyPress { key, .. } => session.keys.set_pressed(*key),
            DisplayEvent::KeyRelease { key, .. } => session.keys.set_released(*key),
            DisplayEvent::ClientMessage {
                window,
                message_type,
                format,
                data,
            } => {
                let atoms = session.protocol_atoms();
                if !atoms.is_close_request(*message_type, *format, data) {
                    session.diag.unhandled_event(EventKind::ClientMessage);
                    return;
                }
                match session.raw_to_id(*window) {
                    Some(id) => {
                        tracing::debug!(window_id = ?id, "close requested for window");
                        if let Err(err) = session.close_window(id) {
                            tracing::warn!(%err, "close request could not be honored");
                        }
                    }
                    None => session.diag.stale_event(EventKind::ClientMessage),
                }
            }
            DisplayEvent::Expose { window, .. } => {
                // The core paints nothing; consumers override this entry.
                // Resolution still runs so stale exposures are dropped
                // with a trace instead of reaching anyone.
                if session.raw_to_id(*window).is_none() {
                    session.diag.stale_event(EventKind::Expose);
                }
            }
            other => session.diag.unhandled_event(other.kind()),
        }
    }
}

impl<D: DisplayDriver, A> Default for EventRouter<D, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::replay::ReplayDriver;
    use crate::keys;
    use crate::mask::EventMask;
    use crate::windows::WindowId;

    #[test]
    fn default_key_handling_reaches_the_tracker() {
        let mut session = Session::new(ReplayDriver::new());
        session
            .open_window(WindowId(1), 0, 0, 64, 64, EventMask::new().key_press(), "keys")
            .unwrap();
        let raw = session.raw_window(WindowId(1)).unwrap();
        session.driver_mut().push_event(DisplayEvent::KeyPress {
            window: raw,
            key: keys::SPACE,
            x: 0,
            y: 0,
        });

        let mut router: EventRouter<ReplayDriver, ()> = EventRouter::new();
        let handled = router.drain_pending(&mut session, &mut ()).unwrap();
        assert_eq!(handled, 1);
        assert!(session.key_is_down(keys::SPACE));
    }

    #[test]
    fn reset_restores_the_default() {
        let mut session = Session::new(ReplayDriver::new());
        session
            .open_window(WindowId(1), 0, 0, 64, 64, EventMask::new(), "reset")
            .unwrap();
        let raw = session.raw_window(WindowId(1)).unwrap();

        let mut router: EventRouter<ReplayDriver, u32> = EventRouter::new();
        router.on(EventKind::KeyPress, |_, hits, _| *hits += 1);

        let press = DisplayEvent::KeyPress {
            window: raw,
            key: keys::ESCAPE,
            x: 0,
            y: 0,
        };
        let mut hits = 0;
        router.dispatch(&mut session, &mut hits, &press);
        assert_eq!(hits, 1);
        // the override swallowed the event: the tracker never saw it
        assert!(!session.key_is_down(keys::ESCAPE));

        router.reset(EventKind::KeyPress);
        router.dispatch(&mut session, &mut hits, &press);
        assert_eq!(hits, 1);
        assert!(session.key_is_down(keys::ESCAPE));
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use x11kit::diag::DiagnosticsSink;
use x11kit::drivers::replay::{DriverOp, ReplayDriver};
use x11kit::events::{Atom, DisplayEvent, EventKind};
use x11kit::keys;
use x11kit::mask::EventMask;
use x11kit::router::EventRouter;
use x11kit::session::Session;
use x11kit::windows::WindowId;

#[derive(Default)]
struct DiagCounts {
    unhandled: AtomicUsize,
    stale: AtomicUsize,
}

impl DiagnosticsSink for DiagCounts {
    fn unhandled_event(&self, _kind: EventKind) {
        self.unhandled.fetch_add(1, Ordering::Relaxed);
    }

    fn stale_event(&self, _kind: EventKind) {
        self.stale.fetch_add(1, Ordering::Relaxed);
    }
}

fn input_mask() -> EventMask {
    EventMask::new().exposure().key_press().key_release()
}

#[test]
fn drained_key_events_update_edge_and_level_queries() {
    let mut session = Session::new(ReplayDriver::new());
    session
        .open_window(WindowId(1), 0, 0, 100, 100, input_mask(), "keys")
        .unwrap();
    let win = session.raw_window(WindowId(1)).unwrap();
    let mut router = EventRouter::new();
    let mut app = ();

    session.driver_mut().push_event(DisplayEvent::KeyPress {
        window: win,
        key: keys::LEFT,
        x: 0,
        y: 0,
    });
    let handled = router.drain_pending(&mut session, &mut app).unwrap();
    assert_eq!(handled, 1);

    assert!(session.key_is_down(keys::LEFT));
    assert!(session.key_just_pressed(keys::LEFT));
    // edge consumed, level still holds
    assert!(!session.key_just_pressed(keys::LEFT));
    assert!(session.key_is_down(keys::LEFT));

    session.driver_mut().push_event(DisplayEvent::KeyRelease {
        window: win,
        key: keys::LEFT,
        x: 0,
        y: 0,
    });
    router.drain_pending(&mut session, &mut app).unwrap();
    assert!(!session.key_is_down(keys::LEFT));
    assert!(session.key_state_changed());
    assert!(!session.key_just_pressed(keys::LEFT));
    assert!(!session.key_state_changed());
}

#[test]
fn close_request_message_closes_its_window() {
    let driver = ReplayDriver::new();
    let journal = driver.journal();
    let mut session = Session::new(driver);
    session
        .open_window(WindowId(1), 0, 0, 100, 100, input_mask(), "doomed")
        .unwrap();
    let win = session.raw_window(WindowId(1)).unwrap();
    let mut router = EventRouter::new();
    let mut app = ();

    session
        .driver_mut()
        .push_event(ReplayDriver::close_request(win));
    router.drain_pending(&mut session, &mut app).unwrap();

    assert!(!session.is_open(WindowId(1)));
    assert_eq!(session.window_count(), 0);
    assert!(
        journal
            .borrow()
            .contains(&DriverOp::DestroyWindow(win))
    );
}

#[test]
fn foreign_client_messages_count_as_unhandled() {
    let diag = Arc::new(DiagCounts::default());
    let sink: Arc<dyn DiagnosticsSink> = diag.clone();
    let mut session = Session::with_diagnostics(ReplayDriver::new(), sink);
    session
        .open_window(WindowId(1), 0, 0, 100, 100, input_mask(), "open")
        .unwrap();
    let win = session.raw_window(WindowId(1)).unwrap();
    let mut router = EventRouter::new();
    let mut app = ();

    // same shape as a close request, wrong protocol atom
    session.driver_mut().push_event(DisplayEvent::ClientMessage {
        window: win,
        message_type: Atom(999),
        format: 32,
        data: [0; 5],
    });
    router.drain_pending(&mut session, &mut app).unwrap();

    assert_eq!(diag.unhandled.load(Ordering::Relaxed), 1);
    assert!(session.is_open(WindowId(1)));
}

#[test]
fn stale_and_unhandled_events_reach_the_sink() {
    let diag = Arc::new(DiagCounts::default());
    let sink: Arc<dyn DiagnosticsSink> = diag.clone();
    let mut session = Session::with_diagnostics(ReplayDriver::new(), sink);
    session
        .open_window(WindowId(1), 0, 0, 100, 100, input_mask(), "gone")
        .unwrap();
    let win = session.raw_window(WindowId(1)).unwrap();
    session.close_window(WindowId(1)).unwrap();
    let mut router = EventRouter::new();
    let mut app = ();

    // exposure for a window the session no longer tracks
    session.driver_mut().push_event(DisplayEvent::Expose {
        window: win,
        x: 0,
        y: 0,
        width: 10,
        height: 10,
        count: 0,
    });
    // focus events have no default handling at all
    session
        .driver_mut()
        .push_event(DisplayEvent::FocusIn { window: win });
    let handled = router.drain_pending(&mut session, &mut app).unwrap();

    assert_eq!(handled, 2);
    assert_eq!(diag.stale.load(Ordering::Relaxed), 1);
    assert_eq!(diag.unhandled.load(Ordering::Relaxed), 1);
}

#[test]
fn key_override_takes_over_tracker_duty() {
    let mut session = Session::new(ReplayDriver::new());
    session
        .open_window(WindowId(1), 0, 0, 100, 100, input_mask(), "override")
        .unwrap();
    let win = session.raw_window(WindowId(1)).unwrap();

    let mut router = EventRouter::new();
    router.on(EventKind::KeyPress, |session, seen: &mut usize, event| {
        let DisplayEvent::KeyPress { key, .. } = event else {
            return;
        };
        session.keys_mut().set_pressed(*key);
        *seen += 1;
    });

    let mut seen = 0usize;
    session.driver_mut().push_event(DisplayEvent::KeyPress {
        window: win,
        key: keys::SPACE,
        x: 0,
        y: 0,
    });
    router.drain_pending(&mut session, &mut seen).unwrap();

    assert_eq!(seen, 1);
    assert!(session.key_is_down(keys::SPACE));
}

#[test]
fn redraw_flush_is_fifo_and_skips_closed_windows() {
    let driver = ReplayDriver::new();
    let journal = driver.journal();
    let mut session = Session::new(driver);
    for n in 1..=3 {
        session
            .open_window(WindowId(n), 0, 0, 100, 100, input_mask(), "grid")
            .unwrap();
    }
    let raw1 = session.raw_window(WindowId(1)).unwrap();
    let raw3 = session.raw_window(WindowId(3)).unwrap();

    let mut router = EventRouter::new();
    router.on(
        EventKind::Expose,
        |session, painted: &mut Vec<WindowId>, event| {
            let DisplayEvent::Expose { window, count, .. } = event else {
                return;
            };
            if *count != 0 {
                return;
            }
            if let Some(id) = session.raw_to_id(*window) {
                painted.push(id);
            }
        },
    );

    // duplicates are legitimate and flushed as often as scheduled
    session.schedule_redraw(WindowId(1));
    session.schedule_redraw(WindowId(2));
    session.schedule_redraw(WindowId(1));
    session.schedule_redraw(WindowId(3));
    session.close_window(WindowId(2)).unwrap();
    let before = journal.borrow().len();

    let mut painted = Vec::new();
    let repainted = router.flush_redraws(&mut session, &mut painted).unwrap();

    assert_eq!(repainted, 3);
    assert_eq!(painted, vec![WindowId(1), WindowId(1), WindowId(3)]);
    assert_eq!(session.pending_redraws(), 0);
    assert_eq!(
        journal.borrow()[before..],
        [
            DriverOp::ClearWindow(raw1),
            DriverOp::ClearWindow(raw1),
            DriverOp::ClearWindow(raw3),
            DriverOp::Flush,
        ]
    );

    // nothing queued, nothing flushed
    let again = router.flush_redraws(&mut session, &mut painted).unwrap();
    assert_eq!(again, 0);
    assert_eq!(journal.borrow().len(), before + 4);
}

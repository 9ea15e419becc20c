use x11kit::drivers::replay::{DriverOp, OpJournal, ReplayDriver};
use x11kit::error::SessionError;
use x11kit::mask::EventMask;
use x11kit::session::Session;
use x11kit::windows::{RawWindow, WindowId};

fn session_with_journal() -> (Session<ReplayDriver>, OpJournal) {
    let driver = ReplayDriver::new();
    let journal = driver.journal();
    (Session::new(driver), journal)
}

#[test]
fn open_issues_the_full_native_sequence() {
    let (mut session, journal) = session_with_journal();
    let mask = EventMask::new().exposure().key_press();
    session
        .open_window(WindowId(1), 100, 100, 550, 300, mask, "demo")
        .unwrap();

    assert!(session.is_open(WindowId(1)));
    assert_eq!(session.window_count(), 1);

    let win = session.raw_window(WindowId(1)).unwrap();
    let ops = journal.borrow();
    assert_eq!(
        *ops,
        vec![
            DriverOp::CreateWindow {
                window: win,
                x: 100,
                y: 100,
                width: 550,
                height: 300,
            },
            DriverOp::SetEventMask(win, mask.bits()),
            DriverOp::SetTitle(win, "demo".to_owned()),
            DriverOp::RegisterCloseProtocol(win),
            DriverOp::MapWindow(win),
            DriverOp::Flush,
        ]
    );
}

#[test]
fn duplicate_open_fails_without_touching_the_existing_window() {
    let (mut session, journal) = session_with_journal();
    let mask = EventMask::new().exposure();
    session
        .open_window(WindowId(1), 0, 0, 100, 100, mask, "first")
        .unwrap();
    let raw = session.raw_window(WindowId(1)).unwrap();
    let ops_before = journal.borrow().len();

    let err = session
        .open_window(WindowId(1), 50, 50, 200, 200, mask, "second")
        .unwrap_err();
    assert!(matches!(err, SessionError::DuplicateId(WindowId(1))));

    // the rejected open never reached the driver
    assert_eq!(journal.borrow().len(), ops_before);
    assert_eq!(session.raw_window(WindowId(1)), Some(raw));
    assert_eq!(session.window_count(), 1);
}

#[test]
fn attributes_round_trip_and_close_invalidates() {
    let (mut session, _journal) = session_with_journal();
    let mask = EventMask::new().exposure();
    session
        .open_window(WindowId(7), 10, 20, 300, 200, mask, "probe")
        .unwrap();

    let attrs = session.attributes(WindowId(7)).unwrap();
    assert_eq!((attrs.x, attrs.y), (10, 20));
    assert_eq!((attrs.width, attrs.height), (300, 200));

    session.close_window(WindowId(7)).unwrap();
    assert!(!session.is_open(WindowId(7)));
    let err = session.attributes(WindowId(7)).unwrap_err();
    assert!(matches!(err, SessionError::UnknownWindow(WindowId(7))));
}

#[test]
fn closing_unknown_ids_is_a_quiet_no_op() {
    let (mut session, journal) = session_with_journal();
    session.close_window(WindowId(9)).unwrap();
    assert!(journal.borrow().is_empty());
}

#[test]
fn raw_handle_lookups_track_the_table() {
    let (mut session, _journal) = session_with_journal();
    let mask = EventMask::new().exposure();
    session
        .open_window(WindowId(1), 0, 0, 10, 10, mask, "a")
        .unwrap();
    session
        .open_window(WindowId(2), 0, 0, 10, 10, mask, "b")
        .unwrap();

    let raw2 = session.raw_window(WindowId(2)).unwrap();
    assert_eq!(session.raw_to_id(raw2), Some(WindowId(2)));
    assert_eq!(session.raw_to_id(RawWindow(0xdead)), None);

    session.close_window(WindowId(2)).unwrap();
    assert_eq!(session.raw_to_id(raw2), None);
    assert_eq!(session.raw_window(WindowId(2)), None);
}

#[test]
fn clear_window_flushes_only_on_request() {
    let (mut session, journal) = session_with_journal();
    let mask = EventMask::new().exposure();
    session
        .open_window(WindowId(1), 0, 0, 10, 10, mask, "c")
        .unwrap();
    let win = session.raw_window(WindowId(1)).unwrap();
    let before = journal.borrow().len();

    session.clear_window(WindowId(1), false).unwrap();
    assert_eq!(journal.borrow()[before..], [DriverOp::ClearWindow(win)]);

    session.clear_window(WindowId(1), true).unwrap();
    assert_eq!(
        journal.borrow()[before + 1..],
        [DriverOp::ClearWindow(win), DriverOp::Flush]
    );
}

#[test]
fn teardown_destroys_surviving_windows() {
    let (mut session, journal) = session_with_journal();
    let mask = EventMask::new().exposure();
    session
        .open_window(WindowId(1), 0, 0, 10, 10, mask, "a")
        .unwrap();
    session
        .open_window(WindowId(2), 0, 0, 10, 10, mask, "b")
        .unwrap();
    let raw2 = session.raw_window(WindowId(2)).unwrap();

    session.close_window(WindowId(1)).unwrap();
    drop(session);

    let ops = journal.borrow();
    let destroys = ops
        .iter()
        .filter(|op| matches!(op, DriverOp::DestroyWindow(_)))
        .count();
    assert_eq!(destroys, 2);
    // the survivor goes down during teardown, followed by a final flush
    assert_eq!(ops[ops.len() - 2], DriverOp::DestroyWindow(raw2));
    assert_eq!(ops[ops.len() - 1], DriverOp::Flush);
}

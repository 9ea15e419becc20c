use std::collections::HashMap;
use std::fmt;

/// A layout-resolved key symbol, independent of physical scan position.
///
/// Values are the standard `keysymdef` codes; printable ASCII maps to its
/// own codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeySym(pub u32);

impl KeySym {
    /// Symbol for a printable ASCII character, `None` outside that range.
    pub fn from_char(c: char) -> Option<KeySym> {
        if ('\u{20}'..='\u{7e}').contains(&c) {
            Some(KeySym(c as u32))
        } else {
            None
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for KeySym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

pub const BACKSPACE: KeySym = KeySym(0xff08);
pub const TAB: KeySym = KeySym(0xff09);
pub const RETURN: KeySym = KeySym(0xff0d);
pub const ESCAPE: KeySym = KeySym(0xff1b);
pub const DELETE: KeySym = KeySym(0xffff);
pub const SPACE: KeySym = KeySym(0x0020);
pub const HOME: KeySym = KeySym(0xff50);
pub const LEFT: KeySym = KeySym(0xff51);
pub const UP: KeySym = KeySym(0xff52);
pub const RIGHT: KeySym = KeySym(0xff53);
pub const DOWN: KeySym = KeySym(0xff54);
pub const PAGE_UP: KeySym = KeySym(0xff55);
pub const PAGE_DOWN: KeySym = KeySym(0xff56);
pub const END: KeySym = KeySym(0xff57);
pub const SHIFT_L: KeySym = KeySym(0xffe1);
pub const SHIFT_R: KeySym = KeySym(0xffe2);
pub const CONTROL_L: KeySym = KeySym(0xffe3);
pub const CONTROL_R: KeySym = KeySym(0xffe4);

/// Keyboard state over two maps: the live view and a snapshot used for
/// edge detection and change tracking.
///
/// Released keys are written as `false` rather than removed, so a map
/// comparison distinguishes "released this cycle" from "never touched".
#[derive(Debug, Default)]
pub struct KeyStateTracker {
    current: HashMap<KeySym, bool>,
    snapshot: HashMap<KeySym, bool>,
}

impl KeyStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size both maps when the consumer knows its key set up front.
    pub fn reserve(&mut self, additional: usize) {
        self.current.reserve(additional);
        self.snapshot.reserve(additional);
    }

    /// Mark `key` as held. Called by the router's key-press default.
    pub fn set_pressed(&mut self, key: KeySym) {
        self.current.insert(key, true);
    }

    /// Mark `key` as released. Called by the router's key-release default.
    pub fn set_released(&mut self, key: KeySym) {
        self.current.insert(key, false);
    }

    /// Level query: is `key` held right now?
    pub fn is_down(&self, key: KeySym) -> bool {
        self.current.get(&key).copied().unwrap_or(false)
    }

    /// Edge query: did `key` transition up→down since this was last asked?
    ///
    /// Consumes the edge for `key` by syncing its snapshot entry, so a held
    /// key answers true exactly once per press.
    pub fn is_just_pressed(&mut self, key: KeySym) -> bool {
        let currently_down = self.is_down(key);
        let was_down = self.snapshot.get(&key).copied().unwrap_or(false);
        self.snapshot.insert(key, currently_down);
        currently_down && !was_down
    }

    /// Whole-map comparison: has anything changed since the snapshot was
    /// last synchronized?
    pub fn has_state_changed(&self) -> bool {
        self.current != self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_is_up() {
        let tracker = KeyStateTracker::new();
        assert!(!tracker.is_down(ESCAPE));
        assert!(!tracker.has_state_changed());
    }

    #[test]
    fn just_pressed_fires_once_per_press() {
        let mut tracker = KeyStateTracker::new();
        tracker.set_pressed(SPACE);
        assert!(tracker.is_just_pressed(SPACE));
        // still held: the edge is consumed
        assert!(!tracker.is_just_pressed(SPACE));
        assert!(tracker.is_down(SPACE));

        tracker.set_released(SPACE);
        assert!(!tracker.is_just_pressed(SPACE));
        tracker.set_pressed(SPACE);
        assert!(tracker.is_just_pressed(SPACE));
    }

    #[test]
    fn edge_query_only_syncs_the_queried_key() {
        let mut tracker = KeyStateTracker::new();
        tracker.set_pressed(LEFT);
        tracker.set_pressed(RIGHT);
        assert!(tracker.is_just_pressed(LEFT));
        // RIGHT's edge is still pending
        assert!(tracker.has_state_changed());
        assert!(tracker.is_just_pressed(RIGHT));
        assert!(!tracker.has_state_changed());
    }

    #[test]
    fn state_change_tracks_transitions() {
        let mut tracker = KeyStateTracker::new();
        tracker.set_pressed(ESCAPE);
        assert!(tracker.has_state_changed());
        let _ = tracker.is_just_pressed(ESCAPE);
        assert!(!tracker.has_state_changed());
        tracker.set_released(ESCAPE);
        assert!(tracker.has_state_changed());
        let _ = tracker.is_just_pressed(ESCAPE);
        assert!(!tracker.has_state_changed());
    }

    #[test]
    fn ascii_symbols_map_to_codepoints() {
        assert_eq!(KeySym::from_char(' '), Some(SPACE));
        assert_eq!(KeySym::from_char('q'), Some(KeySym(0x71)));
        assert_eq!(KeySym::from_char('\n'), None);
    }
}

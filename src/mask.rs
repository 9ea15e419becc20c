/// Input-selection mask for [`open_window`](crate::session::Session::open_window).
///
/// Bit values are the core protocol's. Selected bits, in bit order:
///
/// - `key_press` / `key_release`: keyboard down/up events
/// - `button_press` / `button_release`: pointer button down/up events
/// - `enter_window` / `leave_window`: pointer crossing events
/// - `pointer_motion`: full motion stream; `pointer_motion_hint`: hints only
/// - `button1_motion` .. `button5_motion`: motion while that button is down
/// - `button_motion`: motion while any button is down
/// - `keymap_state`: keyboard state on entry and focus-in
/// - `exposure`: exposure events
/// - `visibility_change`: visibility changes
/// - `structure_notify`: structure changes of this window
/// - `resize_redirect`: redirect resizes of this window
/// - `substructure_notify` / `substructure_redirect`: child-window structure
/// - `focus_change`: focus changes
/// - `property_change`: property changes
/// - `colormap_change`: colormap changes
/// - `owner_grab_button`: automatic grabs activate with owner-events set
///
/// The builder chains so call sites read as a sentence:
///
/// ```
/// use x11kit::mask::EventMask;
///
/// let mask = EventMask::new().exposure().key_press().key_release();
/// assert!(!mask.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventMask(u32);

macro_rules! mask_bit {
    ($name:ident, $bit:expr) => {
        #[must_use]
        pub fn $name(self) -> Self {
            Self(self.0 | (1 << $bit))
        }
    };
}

impl EventMask {
    pub fn new() -> Self {
        Self(0)
    }

    /// Drops every selected bit, including ones chained earlier.
    #[must_use]
    pub fn no_event(self) -> Self {
        Self(0)
    }

    mask_bit!(key_press, 0);
    mask_bit!(key_release, 1);
    mask_bit!(button_press, 2);
    mask_bit!(button_release, 3);
    mask_bit!(enter_window, 4);
    mask_bit!(leave_window, 5);
    mask_bit!(pointer_motion, 6);
    mask_bit!(pointer_motion_hint, 7);
    mask_bit!(button1_motion, 8);
    mask_bit!(button2_motion, 9);
    mask_bit!(button3_motion, 10);
    mask_bit!(button4_motion, 11);
    mask_bit!(button5_motion, 12);
    mask_bit!(button_motion, 13);
    mask_bit!(keymap_state, 14);
    mask_bit!(exposure, 15);
    mask_bit!(visibility_change, 16);
    mask_bit!(structure_notify, 17);
    mask_bit!(resize_redirect, 18);
    mask_bit!(substructure_notify, 19);
    mask_bit!(substructure_redirect, 20);
    mask_bit!(focus_change, 21);
    mask_bit!(property_change, 22);
    mask_bit!(colormap_change, 23);
    mask_bit!(owner_grab_button, 24);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

use std::fmt;

use crate::keys::KeySym;
use crate::windows::RawWindow;

/// Interned protocol atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom(pub u32);

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vertex for polygon fills, window-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// One event as delivered by the display service, already translated out
/// of the wire representation.
///
/// The set mirrors what the session dispatches: every variant the router
/// has a default for, plus the kinds it only counts as unhandled. Key
/// events arrive with the keysym resolved; positions are window-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Expose {
        window: RawWindow,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        /// Number of exposure events still following for this window.
        /// Consumers usually repaint only when this reaches zero.
        count: u16,
    },
    KeyPress {
        window: RawWindow,
        key: KeySym,
        x: i16,
        y: i16,
    },
    KeyRelease {
        window: RawWindow,
        key: KeySym,
        x: i16,
        y: i16,
    },
    ButtonPress {
        window: RawWindow,
        button: u8,
        x: i16,
        y: i16,
    },
    ButtonRelease {
        window: RawWindow,
        button: u8,
        x: i16,
        y: i16,
    },
    PointerMotion {
        window: RawWindow,
        x: i16,
        y: i16,
    },
    Enter {
        window: RawWindow,
        x: i16,
        y: i16,
    },
    Leave {
        window: RawWindow,
        x: i16,
        y: i16,
    },
    FocusIn {
        window: RawWindow,
    },
    FocusOut {
        window: RawWindow,
    },
    ClientMessage {
        window: RawWindow,
        message_type: Atom,
        format: u8,
        data: [u32; 5],
    },
    MappingNotify {
        first_keycode: u8,
        count: u8,
    },
    ConfigureNotify {
        window: RawWindow,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    },
    UnmapNotify {
        window: RawWindow,
    },
    MapNotify {
        window: RawWindow,
    },
    DestroyNotify {
        window: RawWindow,
    },
    ReparentNotify {
        window: RawWindow,
        parent: RawWindow,
    },
    PropertyNotify {
        window: RawWindow,
        atom: Atom,
    },
    SelectionClear {
        window: RawWindow,
        selection: Atom,
    },
    SelectionRequest {
        window: RawWindow,
        selection: Atom,
    },
    SelectionNotify {
        window: RawWindow,
        selection: Atom,
    },
    ColormapNotify {
        window: RawWindow,
    },
    VisibilityNotify {
        window: RawWindow,
        state: u8,
    },
    NoExpose {
        drawable: RawWindow,
    },
    GraphicsExpose {
        window: RawWindow,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        count: u16,
    },
}

impl DisplayEvent {
    /// Fieldless tag, used as the router table key.
    pub fn kind(&self) -> EventKind {
        match self {
            DisplayEvent::Expose { .. } => EventKind::Expose,
            DisplayEvent::KeyPress { .. } => EventKind::KeyPress,
            DisplayEvent::KeyRelease { .. } => EventKind::KeyRelease,
            DisplayEvent::ButtonPress { .. } => EventKind::ButtonPress,
            DisplayEvent::ButtonRelease { .. } => EventKind::ButtonRelease,
            DisplayEvent::PointerMotion { .. } => EventKind::PointerMotion,
            DisplayEvent::Enter { .. } => EventKind::Enter,
            DisplayEvent::Leave { .. } => EventKind::Leave,
            DisplayEvent::FocusIn { .. } => EventKind::FocusIn,
            DisplayEvent::FocusOut { .. } => EventKind::FocusOut,
            DisplayEvent::ClientMessage { .. } => EventKind::ClientMessage,
            DisplayEvent::MappingNotify { .. } => EventKind::MappingNotify,
            DisplayEvent::ConfigureNotify { .. } => EventKind::ConfigureNotify,
            DisplayEvent::UnmapNotify { .. } => EventKind::UnmapNotify,
            DisplayEvent::MapNotify { .. } => EventKind::MapNotify,
            DisplayEvent::DestroyNotify { .. } => EventKind::DestroyNotify,
            DisplayEvent::ReparentNotify { .. } => EventKind::ReparentNotify,
            DisplayEvent::PropertyNotify { .. } => EventKind::PropertyNotify,
            DisplayEvent::SelectionClear { .. } => EventKind::SelectionClear,
            DisplayEvent::SelectionRequest { .. } => EventKind::SelectionRequest,
            DisplayEvent::SelectionNotify { .. } => EventKind::SelectionNotify,
            DisplayEvent::ColormapNotify { .. } => EventKind::ColormapNotify,
            DisplayEvent::VisibilityNotify { .. } => EventKind::VisibilityNotify,
            DisplayEvent::NoExpose { .. } => EventKind::NoExpose,
            DisplayEvent::GraphicsExpose { .. } => EventKind::GraphicsExpose,
        }
    }

    /// The native window this event refers to, where the protocol carries
    /// one. Keyboard-mapping changes are display-wide and answer `None`.
    pub fn window(&self) -> Option<RawWindow> {
        match *self {
            DisplayEvent::Expose { window, .. }
            | DisplayEvent::KeyPress { window, .. }
            | DisplayEvent::KeyRelease { window, .. }
            | DisplayEvent::ButtonPress { window, .. }
            | DisplayEvent::ButtonRelease { window, .. }
            | DisplayEvent::PointerMotion { window, .. }
            | DisplayEvent::Enter { window, .. }
            | DisplayEvent::Leave { window, .. }
            | DisplayEvent::FocusIn { window }
            | DisplayEvent::FocusOut { window }
            | DisplayEvent::ClientMessage { window, .. }
            | DisplayEvent::ConfigureNotify { window, .. }
            | DisplayEvent::UnmapNotify { window }
            | DisplayEvent::MapNotify { window }
            | DisplayEvent::DestroyNotify { window }
            | DisplayEvent::ReparentNotify { window, .. }
            | DisplayEvent::PropertyNotify { window, .. }
            | DisplayEvent::SelectionClear { window, .. }
            | DisplayEvent::SelectionRequest { window, .. }
            | DisplayEvent::SelectionNotify { window, .. }
            | DisplayEvent::ColormapNotify { window }
            | DisplayEvent::VisibilityNotify { window, .. }
            | DisplayEvent::GraphicsExpose { window, .. } => Some(window),
            DisplayEvent::NoExpose { drawable } => Some(drawable),
            DisplayEvent::MappingNotify { .. } => None,
        }
    }
}

/// Event kinds the session understands, used to key handler registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Expose,
    KeyPress,
    KeyRelease,
    ButtonPress,
    ButtonRelease,
    PointerMotion,
    Enter,
    Leave,
    FocusIn,
    FocusOut,
    ClientMessage,
    MappingNotify,
    ConfigureNotify,
    UnmapNotify,
    MapNotify,
    DestroyNotify,
    ReparentNotify,
    PropertyNotify,
    SelectionClear,
    SelectionRequest,
    SelectionNotify,
    ColormapNotify,
    VisibilityNotify,
    NoExpose,
    GraphicsExpose,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    #[test]
    fn kind_and_window_agree_for_key_events() {
        let ev = DisplayEvent::KeyPress {
            window: RawWindow(0x2c),
            key: keys::SPACE,
            x: 4,
            y: 9,
        };
        assert_eq!(ev.kind(), EventKind::KeyPress);
        assert_eq!(ev.window(), Some(RawWindow(0x2c)));
    }

    #[test]
    fn mapping_notify_has_no_window() {
        let ev = DisplayEvent::MappingNotify {
            first_keycode: 8,
            count: 240,
        };
        assert_eq!(ev.kind(), EventKind::MappingNotify);
        assert_eq!(ev.window(), None);
    }
}

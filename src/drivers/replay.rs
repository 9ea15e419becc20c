use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use super::{DisplayDriver, ProtocolAtoms};
use crate::error::{Result, SessionError};
use crate::events::{Atom, DisplayEvent, Point};
use crate::mask::EventMask;
use crate::windows::{RawWindow, WindowAttributes};

/// One driver call as the session issued it, for post-hoc inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverOp {
    CreateWindow {
        window: RawWindow,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    },
    DestroyWindow(RawWindow),
    SetEventMask(RawWindow, u32),
    SetTitle(RawWindow, String),
    MapWindow(RawWindow),
    RegisterCloseProtocol(RawWindow),
    ClearWindow(RawWindow),
    AllocColor {
        red: u16,
        green: u16,
        blue: u16,
        pixel: u32,
    },
    FillRectangle {
        window: RawWindow,
        pixel: u32,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    },
    FillArc {
        window: RawWindow,
        pixel: u32,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    },
    DrawSegment {
        window: RawWindow,
        pixel: u32,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
    },
    DrawText {
        window: RawWindow,
        pixel: u32,
        x: i16,
        y: i16,
        font: String,
        text: String,
    },
    FillPolygon {
        window: RawWindow,
        pixel: u32,
        points: Vec<Point>,
    },
    Flush,
}

/// Shared handle onto a [`ReplayDriver`]'s call journal. Clone it before
/// handing the driver to a session; it stays readable after the session
/// (and the driver inside it) is gone.
pub type OpJournal = Rc<RefCell<Vec<DriverOp>>>;

/// Scripted stand-in for the real display backend.
///
/// Events are fed in up front (or between drains) and come back out of
/// `poll_event` in order; every call the session makes is journaled.
/// Requests against handles this driver never issued, or issued and then
/// destroyed, are hard errors so tests catch session bookkeeping bugs.
pub struct ReplayDriver {
    script: VecDeque<DisplayEvent>,
    journal: OpJournal,
    next_handle: u32,
    geometry: BTreeMap<RawWindow, WindowAttributes>,
}

impl ReplayDriver {
    pub const ATOMS: ProtocolAtoms = ProtocolAtoms {
        wm_protocols: Atom(300),
        wm_delete_window: Atom(301),
    };

    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            journal: Rc::new(RefCell::new(Vec::new())),
            next_handle: 1,
            geometry: BTreeMap::new(),
        }
    }

    /// Queue one event for the next drain.
    pub fn push_event(&mut self, event: DisplayEvent) {
        self.script.push_back(event);
    }

    pub fn extend_events(&mut self, events: impl IntoIterator<Item = DisplayEvent>) {
        self.script.extend(events);
    }

    pub fn journal(&self) -> OpJournal {
        Rc::clone(&self.journal)
    }

    /// The close-request client message a window manager would deliver
    /// for `window` under this driver's handshake atoms.
    pub fn close_request(window: RawWindow) -> DisplayEvent {
        DisplayEvent::ClientMessage {
            window,
            message_type: Self::ATOMS.wm_protocols,
            format: 32,
            data: [Self::ATOMS.wm_delete_window.0, 0, 0, 0, 0],
        }
    }

    fn record(&self, op: DriverOp) {
        self.journal.borrow_mut().push(op);
    }

    fn known(&self, window: RawWindow, what: &str) -> Result<()> {
        if self.geometry.contains_key(&window) {
            Ok(())
        } else {
            Err(SessionError::display(format!(
                "{what} against unknown native window {window}"
            )))
        }
    }
}

impl Default for ReplayDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayDriver for ReplayDriver {
    fn poll_event(&mut self) -> Result<Option<DisplayEvent>> {
        Ok(self.script.pop_front())
    }

    fn create_window(&mut self, x: i16, y: i16, width: u16, height: u16) -> Result<RawWindow> {
        let window = RawWindow(self.next_handle);
        self.next_handle += 1;
        self.geometry.insert(
            window,
            WindowAttributes {
                x,
                y,
                width,
                height,
                border_width: 1,
                depth: 24,
            },
        );
        self.record(DriverOp::CreateWindow {
            window,
            x,
            y,
            width,
            height,
        });
        Ok(window)
    }

    fn destroy_window(&mut self, window: RawWindow) -> Result<()> {
        if self.geometry.remove(&window).is_none() {
            return Err(SessionError::display(format!(
                "destroy of unknown native window {window}"
            )));
        }
        self.record(DriverOp::DestroyWindow(window));
        Ok(())
    }

    fn set_event_mask(&mut self, window: RawWindow, mask: EventMask) -> Result<()> {
        self.known(window, "set_event_mask")?;
        self.record(DriverOp::SetEventMask(window, mask.bits()));
        Ok(())
    }

    fn set_title(&mut self, window: RawWindow, title: &str) -> Result<()> {
        self.known(window, "set_title")?;
        self.record(DriverOp::SetTitle(window, title.to_owned()));
        Ok(())
    }

    fn map_window(&mut self, window: RawWindow) -> Result<()> {
        self.known(window, "map_window")?;
        self.record(DriverOp::MapWindow(window));
        Ok(())
    }

    fn register_close_protocol(&mut self, window: RawWindow) -> Result<()> {
        self.known(window, "register_close_protocol")?;
        self.record(DriverOp::RegisterCloseProtocol(window));
        Ok(())
    }

    fn protocol_atoms(&self) -> ProtocolAtoms {
        Self::ATOMS
    }

    fn clear_window(&mut self, window: RawWindow) -> Result<()> {
        self.known(window, "clear_window")?;
        self.record(DriverOp::ClearWindow(window));
        Ok(())
    }

    fn window_geometry(&mut self, window: RawWindow) -> Result<WindowAttributes> {
        self.geometry.get(&window).copied().ok_or_else(|| {
            SessionError::display(format!("geometry query against unknown native window {window}"))
        })
    }

    fn alloc_color(&mut self, red: u16, green: u16, blue: u16) -> Result<u32> {
        let pixel =
            (u32::from(red >> 8) << 16) | (u32::from(green >> 8) << 8) | u32::from(blue >> 8);
        self.record(DriverOp::AllocColor {
            red,
            green,
            blue,
            pixel,
        });
        Ok(pixel)
    }

    fn fill_rectangle(
        &mut self,
        window: RawWindow,
        pixel: u32,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> Result<()> {
        self.known(window, "fill_rectangle")?;
        self.record(DriverOp::FillRectangle {
            window,
            pixel,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn fill_arc(
        &mut self,
        window: RawWindow,
        pixel: u32,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> Result<()> {
        self.known(window, "fill_arc")?;
        self.record(DriverOp::FillArc {
            window,
            pixel,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn draw_segment(
        &mut self,
        window: RawWindow,
        pixel: u32,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
    ) -> Result<()> {
        self.known(window, "draw_segment")?;
        self.record(DriverOp::DrawSegment {
            window,
            pixel,
            x1,
            y1,
            x2,
            y2,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        window: RawWindow,
        pixel: u32,
        x: i16,
        y: i16,
        font_xlfd: &str,
        text: &str,
    ) -> Result<()> {
        self.known(window, "draw_text")?;
        self.record(DriverOp::DrawText {
            window,
            pixel,
            x,
            y,
            font: font_xlfd.to_owned(),
            text: text.to_owned(),
        });
        Ok(())
    }

    fn fill_polygon(&mut self, window: RawWindow, pixel: u32, points: &[Point]) -> Result<()> {
        self.known(window, "fill_polygon")?;
        self.record(DriverOp::FillPolygon {
            window,
            pixel,
            points: points.to_vec(),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.record(DriverOp::Flush);
        Ok(())
    }
}

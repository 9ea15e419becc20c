use x11rb::COPY_DEPTH_FROM_PARENT;
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::{
    self, AtomEnum, ChangeWindowAttributesAux, ConnectionExt as _, CoordMode, CreateGCAux,
    CreateWindowAux, PolyShape, PropMode, Screen, WindowClass,
};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use super::{DisplayDriver, ProtocolAtoms};
use crate::error::{Result, SessionError};
use crate::events::{Atom, DisplayEvent, Point};
use crate::keys::KeySym;
use crate::mask::EventMask;
use crate::windows::{RawWindow, WindowAttributes};

/// Keycode → keysym table, fetched once at connect time and refreshed when
/// the server reports a keyboard mapping change.
struct Keymap {
    min_keycode: u8,
    keysyms_per_keycode: u8,
    keysyms: Vec<u32>,
}

impl Keymap {
    /// First symbol for the keycode (unshifted group), `NoSymbol` when the
    /// code is outside the table.
    fn lookup(&self, keycode: u8) -> KeySym {
        if keycode < self.min_keycode {
            return KeySym(0);
        }
        let index =
            usize::from(keycode - self.min_keycode) * usize::from(self.keysyms_per_keycode);
        KeySym(self.keysyms.get(index).copied().unwrap_or(0))
    }
}

/// The real display backend over an in-process X11 connection.
pub struct X11Driver {
    conn: RustConnection,
    screen: Screen,
    atoms: ProtocolAtoms,
    keymap: Keymap,
}

impl X11Driver {
    /// Connects to the display named by `display_name`, or `$DISPLAY` when
    /// `None`. Failure here is the only fatal error class; everything the
    /// driver reports afterwards is a soft `Display` error.
    pub fn connect(display_name: Option<&str>) -> Result<Self> {
        let (conn, screen_num) =
            x11rb::connect(display_name).map_err(|err| SessionError::Connect(err.to_string()))?;
        let screen = conn.setup().roots[screen_num].clone();

        let keymap =
            Self::fetch_keymap(&conn).map_err(|err| SessionError::Connect(err.to_string()))?;

        let wm_protocols = conn
            .intern_atom(false, b"WM_PROTOCOLS")
            .map_err(|err| SessionError::Connect(err.to_string()))?
            .reply()
            .map_err(|err| SessionError::Connect(err.to_string()))?
            .atom;
        let wm_delete_window = conn
            .intern_atom(false, b"WM_DELETE_WINDOW")
            .map_err(|err| SessionError::Connect(err.to_string()))?
            .reply()
            .map_err(|err| SessionError::Connect(err.to_string()))?
            .atom;

        tracing::debug!(screen = screen_num, "connected to display");

        Ok(Self {
            conn,
            screen,
            atoms: ProtocolAtoms {
                wm_protocols: Atom(wm_protocols),
                wm_delete_window: Atom(wm_delete_window),
            },
            keymap,
        })
    }

    /// Whether a display can be reached at all. Probe for binaries that
    /// want a clean message instead of a connect error.
    pub fn available(display_name: Option<&str>) -> bool {
        x11rb::connect(display_name).is_ok()
    }

    fn fetch_keymap(conn: &RustConnection) -> std::result::Result<Keymap, x11rb::errors::ReplyError> {
        let setup = conn.setup();
        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode - setup.min_keycode + 1;
        let reply = conn.get_keyboard_mapping(min_keycode, count)?.reply()?;
        Ok(Keymap {
            min_keycode,
            keysyms_per_keycode: reply.keysyms_per_keycode,
            keysyms: reply.keysyms,
        })
    }

    fn refresh_keymap(&mut self) -> Result<()> {
        self.keymap = Self::fetch_keymap(&self.conn).map_err(SessionError::display)?;
        tracing::debug!("reloaded keyboard mapping");
        Ok(())
    }

    fn new_gc(&self, window: RawWindow, pixel: u32) -> Result<u32> {
        let gc = self.conn.generate_id().map_err(SessionError::display)?;
        let aux = CreateGCAux::new().foreground(pixel);
        self.conn
            .create_gc(gc, window.0, &aux)
            .map_err(SessionError::display)?;
        Ok(gc)
    }

    /// TEXT8 items carry at most 254 bytes each; longer strings continue
    /// in followup items with zero delta.
    fn poly_text(&self, window: RawWindow, gc: u32, x: i16, y: i16, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let mut items = Vec::with_capacity(text.len() + 2);
        for chunk in text.as_bytes().chunks(254) {
            items.push(chunk.len() as u8);
            items.push(0);
            items.extend_from_slice(chunk);
        }
        self.conn
            .poly_text8(window.0, gc, x, y, &items)
            .map_err(SessionError::display)
            .map(|_| ())
    }

    /// Turns one wire event into the session's representation. `None`
    /// means the event carries nothing for the session: absorbed protocol
    /// errors, extension events, and the kinds the session never models.
    fn translate(&mut self, event: Event) -> Result<Option<DisplayEvent>> {
        let translated = match event {
            Event::Expose(ev) => Some(DisplayEvent::Expose {
                window: RawWindow(ev.window),
                x: ev.x,
                y: ev.y,
                width: ev.width,
                height: ev.height,
                count: ev.count,
            }),
            Event::KeyPress(ev) => Some(DisplayEvent::KeyPress {
                window: RawWindow(ev.event),
                key: self.keymap.lookup(ev.detail),
                x: ev.event_x,
                y: ev.event_y,
            }),
            Event::KeyRelease(ev) => Some(DisplayEvent::KeyRelease {
                window: RawWindow(ev.event),
                key: self.keymap.lookup(ev.detail),
                x: ev.event_x,
                y: ev.event_y,
            }),
            Event::ButtonPress(ev) => Some(DisplayEvent::ButtonPress {
                window: RawWindow(ev.event),
                button: ev.detail,
                x: ev.event_x,
                y: ev.event_y,
            }),
            Event::ButtonRelease(ev) => Some(DisplayEvent::ButtonRelease {
                window: RawWindow(ev.event),
                button: ev.detail,
                x: ev.event_x,
                y: ev.event_y,
            }),
            Event::MotionNotify(ev) => Some(DisplayEvent::PointerMotion {
                window: RawWindow(ev.event),
                x: ev.event_x,
                y: ev.event_y,
            }),
            Event::EnterNotify(ev) => Some(DisplayEvent::Enter {
                window: RawWindow(ev.event),
                x: ev.event_x,
                y: ev.event_y,
            }),
            Event::LeaveNotify(ev) => Some(DisplayEvent::Leave {
                window: RawWindow(ev.event),
                x: ev.event_x,
                y: ev.event_y,
            }),
            Event::FocusIn(ev) => Some(DisplayEvent::FocusIn {
                window: RawWindow(ev.event),
            }),
            Event::FocusOut(ev) => Some(DisplayEvent::FocusOut {
                window: RawWindow(ev.event),
            }),
            Event::ClientMessage(ev) => Some(DisplayEvent::ClientMessage {
                window: RawWindow(ev.window),
                message_type: Atom(ev.type_),
                format: ev.format,
                data: ev.data.as_data32(),
            }),
            Event::MappingNotify(ev) => {
                if ev.request == xproto::Mapping::KEYBOARD {
                    self.refresh_keymap()?;
                }
                Some(DisplayEvent::MappingNotify {
                    first_keycode: ev.first_keycode,
                    count: ev.count,
                })
            }
            Event::ConfigureNotify(ev) => Some(DisplayEvent::ConfigureNotify {
                window: RawWindow(ev.window),
                x: ev.x,
                y: ev.y,
                width: ev.width,
                height: ev.height,
            }),
            Event::UnmapNotify(ev) => Some(DisplayEvent::UnmapNotify {
                window: RawWindow(ev.window),
            }),
            Event::MapNotify(ev) => Some(DisplayEvent::MapNotify {
                window: RawWindow(ev.window),
            }),
            Event::DestroyNotify(ev) => Some(DisplayEvent::DestroyNotify {
                window: RawWindow(ev.window),
            }),
            Event::ReparentNotify(ev) => Some(DisplayEvent::ReparentNotify {
                window: RawWindow(ev.window),
                parent: RawWindow(ev.parent),
            }),
            Event::PropertyNotify(ev) => Some(DisplayEvent::PropertyNotify {
                window: RawWindow(ev.window),
                atom: Atom(ev.atom),
            }),
            Event::SelectionClear(ev) => Some(DisplayEvent::SelectionClear {
                window: RawWindow(ev.owner),
                selection: Atom(ev.selection),
            }),
            Event::SelectionRequest(ev) => Some(DisplayEvent::SelectionRequest {
                window: RawWindow(ev.owner),
                selection: Atom(ev.selection),
            }),
            Event::SelectionNotify(ev) => Some(DisplayEvent::SelectionNotify {
                window: RawWindow(ev.requestor),
                selection: Atom(ev.selection),
            }),
            Event::ColormapNotify(ev) => Some(DisplayEvent::ColormapNotify {
                window: RawWindow(ev.window),
            }),
            Event::VisibilityNotify(ev) => Some(DisplayEvent::VisibilityNotify {
                window: RawWindow(ev.window),
                state: u8::from(ev.state),
            }),
            Event::NoExposure(ev) => Some(DisplayEvent::NoExpose {
                drawable: RawWindow(ev.drawable),
            }),
            Event::GraphicsExposure(ev) => Some(DisplayEvent::GraphicsExpose {
                window: RawWindow(ev.drawable),
                x: ev.x,
                y: ev.y,
                width: ev.width,
                height: ev.height,
                count: ev.count,
            }),
            Event::Error(err) => {
                // Unchecked requests deliver failures here, typically a
                // draw racing a window teardown. Not fatal to the session.
                tracing::debug!(error = ?err, "absorbed protocol error event");
                None
            }
            other => {
                tracing::trace!(event = ?other, "ignoring event kind outside the session model");
                None
            }
        };
        Ok(translated)
    }
}

impl DisplayDriver for X11Driver {
    fn poll_event(&mut self) -> Result<Option<DisplayEvent>> {
        loop {
            let Some(event) = self.conn.poll_for_event().map_err(SessionError::display)? else {
                return Ok(None);
            };
            if let Some(translated) = self.translate(event)? {
                return Ok(Some(translated));
            }
        }
    }

    fn create_window(&mut self, x: i16, y: i16, width: u16, height: u16) -> Result<RawWindow> {
        let wid = self.conn.generate_id().map_err(SessionError::display)?;
        let aux = CreateWindowAux::new()
            .background_pixel(self.screen.white_pixel)
            .border_pixel(self.screen.black_pixel);
        self.conn
            .create_window(
                COPY_DEPTH_FROM_PARENT,
                wid,
                self.screen.root,
                x,
                y,
                width,
                height,
                1,
                WindowClass::INPUT_OUTPUT,
                self.screen.root_visual,
                &aux,
            )
            .map_err(SessionError::display)?;
        Ok(RawWindow(wid))
    }

    fn destroy_window(&mut self, window: RawWindow) -> Result<()> {
        self.conn
            .destroy_window(window.0)
            .map_err(SessionError::display)
            .map(|_| ())
    }

    fn set_event_mask(&mut self, window: RawWindow, mask: EventMask) -> Result<()> {
        let aux =
            ChangeWindowAttributesAux::new().event_mask(xproto::EventMask::from(mask.bits()));
        self.conn
            .change_window_attributes(window.0, &aux)
            .map_err(SessionError::display)
            .map(|_| ())
    }

    fn set_title(&mut self, window: RawWindow, title: &str) -> Result<()> {
        self.conn
            .change_property8(
                PropMode::REPLACE,
                window.0,
                AtomEnum::WM_NAME,
                AtomEnum::STRING,
                title.as_bytes(),
            )
            .map_err(SessionError::display)
            .map(|_| ())
    }

    fn map_window(&mut self, window: RawWindow) -> Result<()> {
        self.conn
            .map_window(window.0)
            .map_err(SessionError::display)
            .map(|_| ())
    }

    fn register_close_protocol(&mut self, window: RawWindow) -> Result<()> {
        self.conn
            .change_property32(
                PropMode::REPLACE,
                window.0,
                self.atoms.wm_protocols.0,
                AtomEnum::ATOM,
                &[self.atoms.wm_delete_window.0],
            )
            .map_err(SessionError::display)
            .map(|_| ())
    }

    fn protocol_atoms(&self) -> ProtocolAtoms {
        self.atoms
    }

    fn clear_window(&mut self, window: RawWindow) -> Result<()> {
        self.conn
            .clear_area(false, window.0, 0, 0, 0, 0)
            .map_err(SessionError::display)
            .map(|_| ())
    }

    fn window_geometry(&mut self, window: RawWindow) -> Result<WindowAttributes> {
        let reply = self
            .conn
            .get_geometry(window.0)
            .map_err(SessionError::display)?
            .reply()
            .map_err(SessionError::display)?;
        Ok(WindowAttributes {
            x: reply.x,
            y: reply.y,
            width: reply.width,
            height: reply.height,
            border_width: reply.border_width,
            depth: reply.depth,
        })
    }

    fn alloc_color(&mut self, red: u16, green: u16, blue: u16) -> Result<u32> {
        let reply = self
            .conn
            .alloc_color(self.screen.default_colormap, red, green, blue)
            .map_err(SessionError::display)?
            .reply()
            .map_err(SessionError::display)?;
        Ok(reply.pixel)
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
        let gc = self.new_gc(window, pixel)?;
        let result = self
            .conn
            .poly_fill_rectangle(
                window.0,
                gc,
                &[xproto::Rectangle {
                    x,
                    y,
                    width,
                    height,
                }],
            )
            .map_err(SessionError::display)
            .map(|_| ());
        let _ = self.conn.free_gc(gc);
        result
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
        let gc = self.new_gc(window, pixel)?;
        // angles are in 1/64 degree; a full sweep fills the ellipse
        let arcs = [xproto::Arc {
            x,
            y,
            width,
            height,
            angle1: 0,
            angle2: 360 * 64,
        }];
        let result = self
            .conn
            .poly_fill_arc(window.0, gc, &arcs)
            .map_err(SessionError::display)
            .map(|_| ());
        let _ = self.conn.free_gc(gc);
        result
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
        let gc = self.new_gc(window, pixel)?;
        let result = self
            .conn
            .poly_segment(window.0, gc, &[xproto::Segment { x1, y1, x2, y2 }])
            .map_err(SessionError::display)
            .map(|_| ());
        let _ = self.conn.free_gc(gc);
        result
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
        let font = self.conn.generate_id().map_err(SessionError::display)?;
        self.conn
            .open_font(font, font_xlfd.as_bytes())
            .map_err(SessionError::display)?;
        let gc = self.conn.generate_id().map_err(SessionError::display)?;
        let aux = CreateGCAux::new().foreground(pixel).font(font);
        let created = self
            .conn
            .create_gc(gc, window.0, &aux)
            .map_err(SessionError::display)
            .map(|_| ());
        let result = created.and_then(|()| self.poly_text(window, gc, x, y, text));
        let _ = self.conn.free_gc(gc);
        let _ = self.conn.close_font(font);
        result
    }

    fn fill_polygon(&mut self, window: RawWindow, pixel: u32, points: &[Point]) -> Result<()> {
        let vertices: Vec<xproto::Point> = points
            .iter()
            .map(|p| xproto::Point { x: p.x, y: p.y })
            .collect();
        let gc = self.new_gc(window, pixel)?;
        let result = self
            .conn
            .fill_poly(window.0, gc, PolyShape::CONVEX, CoordMode::ORIGIN, &vertices)
            .map_err(SessionError::display)
            .map(|_| ());
        let _ = self.conn.free_gc(gc);
        result
    }

    fn flush(&mut self) -> Result<()> {
        self.conn.flush().map_err(SessionError::display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keymap_lookup_handles_out_of_range_codes() {
        let keymap = Keymap {
            min_keycode: 8,
            keysyms_per_keycode: 2,
            keysyms: vec![0x61, 0x41, 0x62, 0x42],
        };
        // keycode 8 → first symbol of the first entry
        assert_eq!(keymap.lookup(8), KeySym(0x61));
        assert_eq!(keymap.lookup(9), KeySym(0x62));
        // below the minimum and past the table both answer NoSymbol
        assert_eq!(keymap.lookup(3), KeySym(0));
        assert_eq!(keymap.lookup(200), KeySym(0));
    }
}

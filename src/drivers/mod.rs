pub mod replay;
pub mod x11;

use crate::error::Result;
use crate::events::{Atom, DisplayEvent, Point};
use crate::mask::EventMask;
use crate::windows::{RawWindow, WindowAttributes};

/// The close-window handshake pair the driver registered with the display
/// service. A client message of type `wm_protocols` whose first data word
/// is `wm_delete_window` means the user asked to close that window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolAtoms {
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
}

impl ProtocolAtoms {
    pub fn is_close_request(&self, message_type: Atom, format: u8, data: &[u32; 5]) -> bool {
        message_type == self.wm_protocols && format == 32 && data[0] == self.wm_delete_window.0
    }
}

/// Everything the session asks of the display service.
///
/// One connection, one implementor. The real backend is
/// [`x11::X11Driver`]; [`replay::ReplayDriver`] stands in for it in tests
/// and benchmarks. Window handles passed in always came out of
/// `create_window` on the same driver.
pub trait DisplayDriver {
    /// Non-blocking fetch of the next translated event, `None` when the
    /// queue is momentarily empty.
    fn poll_event(&mut self) -> Result<Option<DisplayEvent>>;

    /// Creates an unmapped top-level window: white background, black
    /// one-pixel border.
    fn create_window(&mut self, x: i16, y: i16, width: u16, height: u16) -> Result<RawWindow>;

    fn destroy_window(&mut self, window: RawWindow) -> Result<()>;

    fn set_event_mask(&mut self, window: RawWindow, mask: EventMask) -> Result<()>;

    fn set_title(&mut self, window: RawWindow, title: &str) -> Result<()>;

    fn map_window(&mut self, window: RawWindow) -> Result<()>;

    /// Opts the window into the close-request handshake described by
    /// [`protocol_atoms`](Self::protocol_atoms).
    fn register_close_protocol(&mut self, window: RawWindow) -> Result<()>;

    fn protocol_atoms(&self) -> ProtocolAtoms;

    fn clear_window(&mut self, window: RawWindow) -> Result<()>;

    fn window_geometry(&mut self, window: RawWindow) -> Result<WindowAttributes>;

    /// Allocates the closest available pixel for a 16-bit-per-channel
    /// color from the default colormap.
    fn alloc_color(&mut self, red: u16, green: u16, blue: u16) -> Result<u32>;

    fn fill_rectangle(
        &mut self,
        window: RawWindow,
        pixel: u32,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> Result<()>;

    /// Fills the full ellipse inscribed in the given bounding box.
    fn fill_arc(
        &mut self,
        window: RawWindow,
        pixel: u32,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> Result<()>;

    fn draw_segment(
        &mut self,
        window: RawWindow,
        pixel: u32,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
    ) -> Result<()>;

    /// Draws `text` with its baseline starting at `(x, y)`, foreground
    /// only, using the core font matching `font_xlfd`.
    fn draw_text(
        &mut self,
        window: RawWindow,
        pixel: u32,
        x: i16,
        y: i16,
        font_xlfd: &str,
        text: &str,
    ) -> Result<()>;

    /// Fills a convex polygon with origin-relative vertices.
    fn fill_polygon(&mut self, window: RawWindow, pixel: u32, points: &[Point]) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_request_requires_type_format_and_payload() {
        let atoms = ProtocolAtoms {
            wm_protocols: Atom(68),
            wm_delete_window: Atom(69),
        };
        let payload = [69, 0, 0, 0, 0];
        assert!(atoms.is_close_request(Atom(68), 32, &payload));
        // wrong message type
        assert!(!atoms.is_close_request(Atom(1), 32, &payload));
        // wrong element format
        assert!(!atoms.is_close_request(Atom(68), 8, &payload));
        // some other protocol in the payload
        assert!(!atoms.is_close_request(Atom(68), 32, &[7, 0, 0, 0, 0]));
    }
}

use crate::drivers::DisplayDriver;
use crate::error::{Result, SessionError};
use crate::events::Point;
use crate::font::FontSpec;
use crate::session::Session;
use crate::windows::{RawWindow, WindowId};

/// An allocated pixel value. Obtain one through
/// [`Session::create_color`]; `from_pixel` wraps a raw pixel value
/// obtained elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pixel: u32,
}

impl Color {
    pub fn from_pixel(pixel: u32) -> Self {
        Self { pixel }
    }

    pub fn pixel(self) -> u32 {
        self.pixel
    }
}

/// Drawing surface of the session. Every op resolves the id first and
/// fails with `UnknownWindow` when it is not open; the actual requests are
/// fire-and-forget, so nothing here confirms the paint landed.
impl<D: DisplayDriver> Session<D> {
    /// Allocates the closest match for a 16-bit-per-channel color.
    pub fn create_color(&mut self, red: u16, green: u16, blue: u16) -> Result<Color> {
        let pixel = self.driver.alloc_color(red, green, blue)?;
        Ok(Color::from_pixel(pixel))
    }

    pub fn draw_rectangle(
        &mut self,
        id: WindowId,
        color: Color,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> Result<()> {
        let raw = self.draw_target(id)?;
        self.driver
            .fill_rectangle(raw, color.pixel(), x, y, width, height)
    }

    /// Filled circle around a center point. A bounding box that leaves
    /// the 16-bit wire range is pinned to its edge instead of wrapping.
    pub fn draw_circle(
        &mut self,
        id: WindowId,
        color: Color,
        center_x: i16,
        center_y: i16,
        radius: u16,
    ) -> Result<()> {
        let raw = self.draw_target(id)?;
        let r = i32::from(radius);
        let x = clamp_coord(i32::from(center_x) - r);
        let y = clamp_coord(i32::from(center_y) - r);
        let diameter = u32::from(radius).saturating_mul(2).min(u32::from(u16::MAX)) as u16;
        self.driver
            .fill_arc(raw, color.pixel(), x, y, diameter, diameter)
    }

    pub fn draw_line(
        &mut self,
        id: WindowId,
        color: Color,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
    ) -> Result<()> {
        let raw = self.draw_target(id)?;
        self.driver.draw_segment(raw, color.pixel(), x1, y1, x2, y2)
    }

    /// Draws `text` with its baseline starting at `(x, y)` in the core
    /// font matching `font`.
    pub fn draw_text(
        &mut self,
        id: WindowId,
        color: Color,
        x: i16,
        y: i16,
        font: &FontSpec,
        text: &str,
    ) -> Result<()> {
        let raw = self.draw_target(id)?;
        self.driver
            .draw_text(raw, color.pixel(), x, y, &font.to_xlfd(), text)
    }

    /// Fills a convex polygon. Fewer than three vertices is nothing to
    /// fill and draws nothing.
    pub fn draw_polygon(&mut self, id: WindowId, color: Color, points: &[Point]) -> Result<()> {
        let raw = self.draw_target(id)?;
        if points.len() < 3 {
            return Ok(());
        }
        self.driver.fill_polygon(raw, color.pixel(), points)
    }

    fn draw_target(&self, id: WindowId) -> Result<RawWindow> {
        self.windows.raw(id).ok_or(SessionError::UnknownWindow(id))
    }
}

fn clamp_coord(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::replay::{DriverOp, ReplayDriver};
    use crate::mask::EventMask;

    #[test]
    fn drawing_validates_the_window_first() {
        let mut session = Session::new(ReplayDriver::new());
        let red = Color::from_pixel(0xff0000);
        let err = session
            .draw_rectangle(WindowId(7), red, 0, 0, 10, 10)
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownWindow(WindowId(7))));
    }

    #[test]
    fn degenerate_polygon_is_a_no_op() {
        let mut session = Session::new(ReplayDriver::new());
        let journal = session.driver_mut().journal();
        session
            .open_window(WindowId(1), 0, 0, 100, 100, EventMask::new(), "poly")
            .unwrap();
        let marker = journal.borrow().len();
        let color = Color::from_pixel(1);
        session
            .draw_polygon(WindowId(1), color, &[Point::new(0, 0), Point::new(5, 5)])
            .unwrap();
        // nothing new journaled: the request never went out
        assert_eq!(journal.borrow().len(), marker);
        session
            .draw_polygon(
                WindowId(1),
                color,
                &[Point::new(0, 0), Point::new(10, 0), Point::new(5, 8)],
            )
            .unwrap();
        assert!(matches!(
            journal.borrow().last(),
            Some(DriverOp::FillPolygon { .. })
        ));
    }

    #[test]
    fn circle_is_issued_as_its_bounding_box() {
        let mut session = Session::new(ReplayDriver::new());
        let journal = session.driver_mut().journal();
        session
            .open_window(WindowId(1), 0, 0, 100, 100, EventMask::new(), "circle")
            .unwrap();
        session
            .draw_circle(WindowId(1), Color::from_pixel(3), 50, 40, 10)
            .unwrap();
        let ops = journal.borrow();
        let Some(DriverOp::FillArc {
            x,
            y,
            width,
            height,
            ..
        }) = ops.last()
        else {
            panic!("expected a fill_arc op");
        };
        assert_eq!((*x, *y), (40, 30));
        assert_eq!((*width, *height), (20, 20));
    }

    #[test]
    fn oversized_circles_pin_to_the_wire_range() {
        let mut session = Session::new(ReplayDriver::new());
        let journal = session.driver_mut().journal();
        session
            .open_window(WindowId(1), 0, 0, 100, 100, EventMask::new(), "circle")
            .unwrap();
        let color = Color::from_pixel(3);
        // diameter tops out, corner bottoms out
        session.draw_circle(WindowId(1), color, 0, 0, 40_000).unwrap();
        // corner alone leaves the range
        session.draw_circle(WindowId(1), color, -32_700, 10, 100).unwrap();
        let ops = journal.borrow();
        let tail = &ops[ops.len() - 2..];
        assert!(matches!(
            tail[0],
            DriverOp::FillArc {
                x: i16::MIN,
                y: i16::MIN,
                width: u16::MAX,
                height: u16::MAX,
                ..
            }
        ));
        assert!(matches!(
            tail[1],
            DriverOp::FillArc {
                x: i16::MIN,
                y: -90,
                width: 200,
                height: 200,
                ..
            }
        ));
    }

    #[test]
    fn create_color_wraps_the_allocated_pixel() {
        let mut session = Session::new(ReplayDriver::new());
        let journal = session.driver_mut().journal();
        let magenta = session.create_color(65535, 0, 65535).unwrap();
        assert_eq!(magenta.pixel(), 0xff00ff);
        assert!(matches!(
            journal.borrow().last(),
            Some(DriverOp::AllocColor {
                red: 65535,
                green: 0,
                blue: 65535,
                pixel: 0xff00ff,
            })
        ));
    }

    #[test]
    fn lines_and_text_are_issued_verbatim() {
        let mut session = Session::new(ReplayDriver::new());
        let journal = session.driver_mut().journal();
        session
            .open_window(WindowId(1), 0, 0, 100, 100, EventMask::new(), "ops")
            .unwrap();
        let color = Color::from_pixel(7);
        session.draw_line(WindowId(1), color, 1, 2, 30, 40).unwrap();
        session
            .draw_text(WindowId(1), color, 10, 20, &FontSpec::new("fixed", 100), "hi")
            .unwrap();
        let ops = journal.borrow();
        let tail = &ops[ops.len() - 2..];
        assert!(matches!(
            tail[0],
            DriverOp::DrawSegment {
                pixel: 7,
                x1: 1,
                y1: 2,
                x2: 30,
                y2: 40,
                ..
            }
        ));
        let DriverOp::DrawText {
            pixel,
            x,
            y,
            font,
            text,
            ..
        } = &tail[1]
        else {
            panic!("expected a draw_text op");
        };
        assert_eq!(*pixel, 7);
        assert_eq!((*x, *y), (10, 20));
        assert_eq!(font, "-*-fixed-medium-r-*-*-*-100-*-*-*-*-*-*");
        assert_eq!(text, "hi");
    }
}

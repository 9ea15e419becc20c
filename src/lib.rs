//! Session-level windowing over X11: one connection, an id-keyed window
//! table, keyboard edge tracking, deferred redraws, and a per-kind event
//! router, all driven by a single-threaded tick loop.
//!
//! The typical shape: connect an [`drivers::x11::X11Driver`], wrap it in a
//! [`Session`], register handler overrides on an [`EventRouter`], and hand
//! everything to [`EventLoop::run`]. Tests swap the backend for
//! [`drivers::replay::ReplayDriver`] and never touch a display.

pub mod diag;
pub mod draw;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod events;
pub mod font;
pub mod keys;
pub mod mask;
pub mod redraw;
pub mod router;
pub mod session;
pub mod tracing_sub;
pub mod windows;

pub use diag::{DiagnosticsSink, NullDiagnostics, TracingDiagnostics};
pub use draw::Color;
pub use drivers::{DisplayDriver, ProtocolAtoms};
pub use error::{Result, SessionError};
pub use event_loop::{ControlFlow, DEFAULT_TICK, EventLoop};
pub use events::{Atom, DisplayEvent, EventKind, Point};
pub use font::FontSpec;
pub use keys::{KeySym, KeyStateTracker};
pub use mask::EventMask;
pub use router::EventRouter;
pub use session::Session;
pub use windows::{RawWindow, WindowAttributes, WindowId};

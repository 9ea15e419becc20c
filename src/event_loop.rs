use std::thread;
use std::time::Duration;

use crate::drivers::DisplayDriver;
use crate::error::Result;
use crate::router::EventRouter;
use crate::session::Session;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// Tick interval the demos run at; close enough to 60Hz for anything
/// driven by held keys.
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// The cooperative tick loop that drives a session.
///
/// Each turn of [`run`](Self::run) does, in order:
/// 1. **Drain**: every pending event is routed (key maps and the window
///    table update as a side effect).
/// 2. **Update**: the consumer's closure runs its own logic, typically
///    checking key state and scheduling redraws, and decides whether to
///    keep going.
/// 3. **Sleep**: the fixed tick interval; this is the only pacing there is.
/// 4. **Repaint**: the redraw queue is flushed through the router's
///    exposure path.
///
/// Everything happens on the caller's thread; `Quit` from the update
/// closure is the one way out.
pub struct EventLoop {
    tick: Duration,
}

impl EventLoop {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    pub fn run<D, A, F>(
        &self,
        session: &mut Session<D>,
        router: &mut EventRouter<D, A>,
        app: &mut A,
        mut update: F,
    ) -> Result<()>
    where
        D: DisplayDriver,
        F: FnMut(&mut Session<D>, &mut A) -> Result<ControlFlow>,
    {
        loop {
            router.drain_pending(session, app)?;
            if let ControlFlow::Quit = update(session, app)? {
                return Ok(());
            }
            thread::sleep(self.tick);
            router.flush_redraws(session, app)?;
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;

use x11kit::diag::TracingDiagnostics;
use x11kit::drivers::x11::X11Driver;
use x11kit::error::Result;
use x11kit::event_loop::{ControlFlow, EventLoop};
use x11kit::events::{DisplayEvent, EventKind};
use x11kit::font::FontSpec;
use x11kit::keys;
use x11kit::mask::EventMask;
use x11kit::router::EventRouter;
use x11kit::session::Session;
use x11kit::windows::WindowId;

const MAIN_WINDOW: WindowId = WindowId(1);

#[derive(Parser, Debug)]
#[command(
    name = "life",
    version = env!("CARGO_PKG_VERSION"),
    about = "Conway's Game of Life: click toggles a cell, space runs/pauses, escape quits"
)]
struct Cli {
    /// Grid columns.
    #[arg(long, value_name = "COLS", default_value_t = 20)]
    cols: usize,

    /// Grid rows.
    #[arg(long, value_name = "ROWS", default_value_t = 20)]
    rows: usize,

    /// Milliseconds between generations while running.
    #[arg(long = "step-ms", value_name = "MS", default_value_t = 250)]
    step_ms: u64,

    /// Display to connect to, such as ":0". Defaults to $DISPLAY.
    #[arg(long, value_name = "DISPLAY")]
    display: Option<String>,
}

struct Life {
    cols: usize,
    rows: usize,
    cells: Vec<bool>,
    scratch: Vec<bool>,
    paused: bool,
}

impl Life {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![false; cols * rows],
            scratch: vec![false; cols * rows],
            paused: true,
        }
    }

    fn index(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    fn toggle(&mut self, col: i32, row: i32) -> bool {
        if col < 0 || col >= self.cols as i32 || row < 0 || row >= self.rows as i32 {
            return false;
        }
        let idx = self.index(col as usize, row as usize);
        self.cells[idx] = !self.cells[idx];
        true
    }

    fn step(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let mut live = 0;
                for dr in -1i32..=1 {
                    for dc in -1i32..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let nr = row as i32 + dr;
                        let nc = col as i32 + dc;
                        if nr < 0
                            || nr >= self.rows as i32
                            || nc < 0
                            || nc >= self.cols as i32
                        {
                            continue;
                        }
                        if self.cells[self.index(nc as usize, nr as usize)] {
                            live += 1;
                        }
                    }
                }
                let idx = self.index(col, row);
                self.scratch[idx] = if self.cells[idx] {
                    live == 2 || live == 3
                } else {
                    live == 3
                };
            }
        }
        std::mem::swap(&mut self.cells, &mut self.scratch);
    }
}

fn main() -> Result<()> {
    x11kit::tracing_sub::init_default();
    let cli = Cli::parse();
    if !(1..=256).contains(&cli.cols) || !(1..=256).contains(&cli.rows) {
        eprintln!("life: grid dimensions must be between 1 and 256");
        process::exit(2);
    }
    let display = cli.display.as_deref();

    if !X11Driver::available(display) {
        eprintln!("life: no X11 display reachable (set DISPLAY or pass --display)");
        process::exit(1);
    }

    let driver = X11Driver::connect(display)?;
    let mut session = Session::with_diagnostics(driver, Arc::new(TracingDiagnostics));

    let mask = EventMask::new()
        .exposure()
        .key_press()
        .key_release()
        .button_press();
    session.open_window(MAIN_WINDOW, 100, 100, 550, 300, mask, "Game of Life")?;

    let mut router = EventRouter::new();
    router.on(EventKind::Expose, |session, life: &mut Life, event| {
        let DisplayEvent::Expose { window, count, .. } = event else {
            return;
        };
        if *count != 0 {
            return;
        }
        let Some(id) = session.raw_to_id(*window) else {
            return;
        };
        if let Err(err) = paint(session, life, id) {
            tracing::warn!(window_id = ?id, %err, "repaint failed");
        }
    });
    router.on(EventKind::ButtonPress, |session, life: &mut Life, event| {
        let DisplayEvent::ButtonPress { window, x, y, .. } = event else {
            return;
        };
        let Some(id) = session.raw_to_id(*window) else {
            return;
        };
        match session.attributes(id) {
            Ok(attrs) if attrs.width > 0 && attrs.height > 0 => {
                let col = *x as i32 * life.cols as i32 / attrs.width as i32;
                let row = *y as i32 * life.rows as i32 / attrs.height as i32;
                if life.toggle(col, row) {
                    session.schedule_redraw(id);
                }
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(window_id = ?id, %err, "click lookup failed"),
        }
    });

    let step_interval = Duration::from_millis(cli.step_ms);
    let mut last_step = Instant::now();
    let mut life = Life::new(cli.cols, cli.rows);
    EventLoop::default().run(&mut session, &mut router, &mut life, move |session, life| {
        if session.key_just_pressed(keys::ESCAPE) || !session.is_open(MAIN_WINDOW) {
            return Ok(ControlFlow::Quit);
        }
        if session.key_just_pressed(keys::SPACE) {
            life.paused = !life.paused;
            session.schedule_redraw(MAIN_WINDOW);
        }
        if !life.paused && last_step.elapsed() >= step_interval {
            life.step();
            session.schedule_redraw(MAIN_WINDOW);
            last_step = Instant::now();
        }
        Ok(ControlFlow::Continue)
    })
}

fn paint(session: &mut Session<X11Driver>, life: &Life, id: WindowId) -> Result<()> {
    if id != MAIN_WINDOW {
        return Ok(());
    }
    let attrs = session.attributes(id)?;
    let cell_w = attrs.width as i32 / life.cols as i32;
    let cell_h = attrs.height as i32 / life.rows as i32;
    if cell_w <= 0 || cell_h <= 0 {
        return Ok(());
    }

    let gray = session.create_color(32000, 32000, 32000)?;
    let black = session.create_color(0, 0, 0)?;

    for row in 0..life.rows {
        for col in 0..life.cols {
            if !life.cells[life.index(col, row)] {
                continue;
            }
            session.draw_rectangle(
                id,
                black,
                (col as i32 * cell_w) as i16,
                (row as i32 * cell_h) as i16,
                (cell_w - 1) as u16,
                (cell_h - 1) as u16,
            )?;
        }
    }

    for col in 0..=life.cols {
        let x = (col as i32 * cell_w) as i16;
        session.draw_line(id, gray, x, 0, x, attrs.height as i16 - 1)?;
    }
    for row in 0..=life.rows {
        let y = (row as i32 * cell_h) as i16;
        session.draw_line(id, gray, 0, y, attrs.width as i16 - 1, y)?;
    }

    if life.paused {
        session.draw_text(id, black, 10, 20, &FontSpec::new("helvetica", 150), "PAUSED")?;
    }
    Ok(())
}

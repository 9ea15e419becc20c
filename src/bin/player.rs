use std::process;
use std::sync::Arc;

use clap::Parser;

use x11kit::diag::TracingDiagnostics;
use x11kit::drivers::x11::X11Driver;
use x11kit::error::Result;
use x11kit::event_loop::{ControlFlow, EventLoop};
use x11kit::events::{DisplayEvent, EventKind, Point};
use x11kit::font::FontSpec;
use x11kit::keys;
use x11kit::mask::EventMask;
use x11kit::router::EventRouter;
use x11kit::session::Session;
use x11kit::windows::WindowId;

const MAIN_WINDOW: WindowId = WindowId(1);
const POPUP_MENU: WindowId = WindowId(2);

const PLAYER_RADIUS: u16 = 20;
const STEP: i16 = 10;

#[derive(Parser, Debug)]
#[command(
    name = "player",
    version = env!("CARGO_PKG_VERSION"),
    about = "Moving-player demo: arrows move, space toggles a popup, escape quits"
)]
struct Cli {
    /// Display to connect to, such as ":0". Defaults to $DISPLAY.
    #[arg(long, value_name = "DISPLAY")]
    display: Option<String>,
}

struct Player {
    x: i16,
    y: i16,
}

fn main() -> Result<()> {
    x11kit::tracing_sub::init_default();
    let cli = Cli::parse();
    let display = cli.display.as_deref();

    if !X11Driver::available(display) {
        eprintln!("player: no X11 display reachable (set DISPLAY or pass --display)");
        process::exit(1);
    }

    let driver = X11Driver::connect(display)?;
    let mut session = Session::with_diagnostics(driver, Arc::new(TracingDiagnostics));

    let mask = EventMask::new().key_press().key_release().exposure();
    session.open_window(MAIN_WINDOW, 100, 100, 550, 300, mask, "Player demo")?;

    let mut router = EventRouter::new();
    router.on(EventKind::Expose, |session, player: &mut Player, event| {
        let DisplayEvent::Expose { window, count, .. } = event else {
            return;
        };
        if *count != 0 {
            return;
        }
        let Some(id) = session.raw_to_id(*window) else {
            return;
        };
        if let Err(err) = paint(session, player, id) {
            tracing::warn!(window_id = ?id, %err, "repaint failed");
        }
    });

    let mut player = Player { x: 50, y: 50 };
    EventLoop::default().run(&mut session, &mut router, &mut player, |session, player| {
        if session.key_just_pressed(keys::ESCAPE) || !session.is_open(MAIN_WINDOW) {
            return Ok(ControlFlow::Quit);
        }
        if session.key_just_pressed(keys::SPACE) {
            if session.is_open(POPUP_MENU) {
                session.close_window(POPUP_MENU)?;
            } else {
                session.open_window(POPUP_MENU, 150, 150, 520, 480, mask, "Popup menu")?;
            }
        }

        let mut dx = 0;
        let mut dy = 0;
        if session.key_is_down(keys::LEFT) {
            dx -= STEP;
        }
        if session.key_is_down(keys::RIGHT) {
            dx += STEP;
        }
        if session.key_is_down(keys::UP) {
            dy -= STEP;
        }
        if session.key_is_down(keys::DOWN) {
            dy += STEP;
        }
        if dx != 0 || dy != 0 {
            let attrs = session.attributes(MAIN_WINDOW)?;
            let r = PLAYER_RADIUS as i16;
            player.x = (player.x + dx).clamp(r, (attrs.width as i16 - r).max(r));
            player.y = (player.y + dy).clamp(r, (attrs.height as i16 - r).max(r));
            session.schedule_redraw(MAIN_WINDOW);
        }
        Ok(ControlFlow::Continue)
    })
}

fn paint(session: &mut Session<X11Driver>, player: &Player, id: WindowId) -> Result<()> {
    match id {
        MAIN_WINDOW => {
            let green = session.create_color(0, 65535, 0)?;
            session.draw_circle(MAIN_WINDOW, green, player.x, player.y, PLAYER_RADIUS)?;
        }
        POPUP_MENU => {
            let blue = session.create_color(0, 0, 65535)?;
            session.draw_text(
                POPUP_MENU,
                blue,
                50,
                460,
                &FontSpec::new("helvetica", 150),
                "This is a popup menu. Press SPACE to close.",
            )?;
            session.draw_rectangle(POPUP_MENU, blue, 20, 20, 200, 100)?;
            session.draw_circle(POPUP_MENU, blue, 300, 200, 75)?;
            let triangle = [
                Point::new(400, 400),
                Point::new(450, 300),
                Point::new(500, 400),
            ];
            session.draw_polygon(POPUP_MENU, blue, &triangle)?;
        }
        _ => {}
    }
    Ok(())
}

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;

use x11kit::diag::DiagnosticsSink;
use x11kit::drivers::replay::ReplayDriver;
use x11kit::events::{DisplayEvent, EventKind};
use x11kit::keys::{self, KeySym};
use x11kit::mask::EventMask;
use x11kit::router::EventRouter;
use x11kit::session::Session;
use x11kit::windows::{RawWindow, WindowId};

const KEY_POOL: [KeySym; 8] = [
    keys::LEFT,
    keys::RIGHT,
    keys::UP,
    keys::DOWN,
    keys::SPACE,
    keys::RETURN,
    keys::TAB,
    keys::ESCAPE,
];

#[derive(Parser, Debug)]
#[command(
    name = "dispatch-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Event-dispatch benchmark for checking session routing throughput"
)]
struct BenchCli {
    /// Synthetic events queued per round.
    #[arg(short = 'e', long = "events", value_name = "COUNT", default_value_t = 10_000)]
    events: usize,

    /// Open windows the events are spread across.
    #[arg(short = 'w', long = "windows", value_name = "COUNT", default_value_t = 4)]
    windows: usize,

    /// Rounds to run. Each round queues, drains, and then flushes one redraw per window.
    #[arg(short = 'r', long = "rounds", value_name = "COUNT", default_value_t = 50)]
    rounds: usize,
}

struct BenchConfig {
    events: usize,
    windows: usize,
    rounds: usize,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(1..=10_000_000).contains(&cli.events) {
            return Err("events must be between 1 and 10000000".to_string());
        }
        if !(1..=64).contains(&cli.windows) {
            return Err("windows must be between 1 and 64".to_string());
        }
        if !(1..=100_000).contains(&cli.rounds) {
            return Err("rounds must be between 1 and 100000".to_string());
        }
        Ok(Self {
            events: cli.events,
            windows: cli.windows,
            rounds: cli.rounds,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let stats = run_benchmark(&config)?;
    println!("{}", stats.final_report(&config));

    Ok(())
}

fn run_benchmark(config: &BenchConfig) -> io::Result<BenchStats> {
    let diag = Arc::new(CountingSink::default());
    let sink: Arc<dyn DiagnosticsSink> = diag.clone();
    let mut session = Session::with_diagnostics(ReplayDriver::new(), sink);

    let mask = EventMask::new()
        .key_press()
        .key_release()
        .pointer_motion()
        .exposure();
    let mut ids = Vec::with_capacity(config.windows);
    let mut raws = Vec::with_capacity(config.windows);
    for n in 0..config.windows {
        let id = WindowId(n as i32 + 1);
        session
            .open_window(id, 0, 0, 640, 480, mask, "bench")
            .map_err(io::Error::other)?;
        ids.push(id);
        let raw = session
            .raw_window(id)
            .ok_or_else(|| io::Error::other("window table out of sync"))?;
        raws.push(raw);
    }

    let mut router = EventRouter::new();
    router.on(EventKind::Expose, |_session, app: &mut BenchApp, _event| {
        app.exposures = app.exposures.saturating_add(1);
    });

    let mut app = BenchApp::default();
    let mut synth = EventSynth::seeded_from_clock();
    let mut stats = BenchStats::new();

    for _ in 0..config.rounds {
        for _ in 0..config.events {
            let event = synth.next_event(&raws);
            session.driver_mut().push_event(event);
        }

        let dispatch_start = Instant::now();
        let dispatched = router
            .drain_pending(&mut session, &mut app)
            .map_err(io::Error::other)?;
        let dispatch_time = dispatch_start.elapsed();

        for id in &ids {
            session.schedule_redraw(*id);
        }
        let flush_start = Instant::now();
        let repainted = router
            .flush_redraws(&mut session, &mut app)
            .map_err(io::Error::other)?;
        let flush_time = flush_start.elapsed();

        stats.record_round(dispatched as u64, dispatch_time, repainted as u64, flush_time);
    }

    stats.exposures = app.exposures;
    stats.unhandled = diag.unhandled.load(Ordering::Relaxed) as u64;
    stats.stale = diag.stale.load(Ordering::Relaxed) as u64;
    stats.mark_completed();
    Ok(stats)
}

#[derive(Default)]
struct BenchApp {
    exposures: u64,
}

#[derive(Default)]
struct CountingSink {
    unhandled: AtomicUsize,
    stale: AtomicUsize,
}

impl DiagnosticsSink for CountingSink {
    fn unhandled_event(&self, _kind: EventKind) {
        self.unhandled.fetch_add(1, Ordering::Relaxed);
    }

    fn stale_event(&self, _kind: EventKind) {
        self.stale.fetch_add(1, Ordering::Relaxed);
    }
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    rounds: u64,
    events_dispatched: u64,
    redraws_flushed: u64,
    total_dispatch_time: Duration,
    total_flush_time: Duration,
    fastest_round: Duration,
    slowest_round: Duration,
    exposures: u64,
    unhandled: u64,
    stale: u64,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            rounds: 0,
            events_dispatched: 0,
            redraws_flushed: 0,
            total_dispatch_time: Duration::ZERO,
            total_flush_time: Duration::ZERO,
            fastest_round: Duration::MAX,
            slowest_round: Duration::ZERO,
            exposures: 0,
            unhandled: 0,
            stale: 0,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn record_round(
        &mut self,
        dispatched: u64,
        dispatch_time: Duration,
        repainted: u64,
        flush_time: Duration,
    ) {
        self.rounds = self.rounds.saturating_add(1);
        self.events_dispatched = self.events_dispatched.saturating_add(dispatched);
        self.redraws_flushed = self.redraws_flushed.saturating_add(repainted);
        self.total_dispatch_time += dispatch_time;
        self.total_flush_time += flush_time;
        let round_time = dispatch_time + flush_time;
        if round_time < self.fastest_round {
            self.fastest_round = round_time;
        }
        if round_time > self.slowest_round {
            self.slowest_round = round_time;
        }
    }

    fn events_per_second(&self) -> f64 {
        let dispatch_secs = self.total_dispatch_time.as_secs_f64();
        if dispatch_secs == 0.0 {
            return 0.0;
        }
        self.events_dispatched as f64 / dispatch_secs
    }

    fn average_flush_us(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        (self.total_flush_time.as_secs_f64() / self.rounds as f64) * 1_000_000.0
    }

    fn fastest_round_ms(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        self.fastest_round.as_secs_f64() * 1_000.0
    }

    fn slowest_round_ms(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        self.slowest_round.as_secs_f64() * 1_000.0
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        indoc::formatdoc!(
            r#"
            Dispatch bench completed.
            Duration: {elapsed:.2}s | Rounds: {rounds} ({windows} windows, {per_round} events/round)
            Events dispatched: {events} (~{rate:.0}/s)
            Redraws flushed: {redraws} | Avg flush: {flush:.1} us/round
            Round total: best {best:.2} ms | worst {worst:.2} ms
            Expose deliveries: {exposures} | Unhandled kinds: {unhandled} | Stale drops: {stale}
            "#,
            elapsed = self.elapsed().as_secs_f64(),
            rounds = self.rounds,
            windows = config.windows,
            per_round = config.events,
            events = self.events_dispatched,
            rate = self.events_per_second(),
            redraws = self.redraws_flushed,
            flush = self.average_flush_us(),
            best = self.fastest_round_ms(),
            worst = self.slowest_round_ms(),
            exposures = self.exposures,
            unhandled = self.unhandled,
            stale = self.stale,
        )
    }
}

struct EventSynth {
    state: u64,
}

impl EventSynth {
    fn seeded_from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
            ^ 0xA5A5_A5A5_1234_5678;
        Self { state: seed }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn next_event(&mut self, raws: &[RawWindow]) -> DisplayEvent {
        let window = raws[self.next() as usize % raws.len()];
        let x = (self.next() % 640) as i16;
        let y = (self.next() % 480) as i16;
        match self.next() % 5 {
            0 => DisplayEvent::KeyPress {
                window,
                key: KEY_POOL[self.next() as usize % KEY_POOL.len()],
                x,
                y,
            },
            1 => DisplayEvent::KeyRelease {
                window,
                key: KEY_POOL[self.next() as usize % KEY_POOL.len()],
                x,
                y,
            },
            2 => DisplayEvent::Expose {
                window,
                x: x as u16,
                y: y as u16,
                width: 64,
                height: 64,
                count: 0,
            },
            _ => DisplayEvent::PointerMotion { window, x, y },
        }
    }
}

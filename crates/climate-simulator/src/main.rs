//! Desktop simulator for the climate node core.
//!
//! Runs a [`NodeContext`] against a mock board: sensors produce synthetic
//! readings at their native cadences, the radio "transmits" by printing the
//! payload, the LCD is rendered as text and the LEDs are logged. Simulated
//! time runs `SIM_SPEEDUP` times faster than wall-clock time (default 60).
//!
//! # Commands (stdin)
//!
//! | Input      | Action                          |
//! |------------|---------------------------------|
//! | p          | Previous page (left click)      |
//! | n          | Next page (right click)         |
//! | h2         | Left hold: send now             |
//! | h3         | Right hold: toggle calibration  |
//! | h4         | Both held: pulse indicator      |
//! | send       | `AT$SEND`                       |
//! | status     | `AT$STATUS`                     |
//! | rx <text>  | Simulate a downlink message     |
//! | q          | Quit                            |

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration as StdDuration;

use embassy_time::{Duration, Instant};
use log::{debug, info, warn};

use climate_core::display::{ButtonEvent, Frame};
use climate_core::events::{Command, MAX_DOWNLINK_LEN, NODE_EVENTS, NodeEvent, RadioEvent};
use climate_core::hal::{CalibrationMode, Co2Module, Console, Display, Led, LedMode, Leds, Radio};
use climate_core::sensors::{SensorError, SensorUpdate, VOC_TAG};
use climate_core::uplink::UplinkPayload;
use climate_core::{NodeConfig, NodeContext};

/// Wall-clock length of one simulation tick.
const TICK: StdDuration = StdDuration::from_millis(50);

/// Default simulated seconds per wall-clock second.
const DEFAULT_SPEEDUP: u64 = 60;

/// How long the mock modem stays busy after accepting a message.
const AIRTIME: Duration = Duration::from_secs(2);

/// Every n-th VOC read fails, to exercise the missing-field path.
const VOC_FAILURE_EVERY: u32 = 7;

static QUIT: AtomicBool = AtomicBool::new(false);

// ---------------------------------------------------------------------------
// Mock board
// ---------------------------------------------------------------------------

struct SimBoard {
    now: Instant,
    busy_until: Option<Instant>,
}

impl SimBoard {
    fn new() -> Self {
        Self {
            now: Instant::from_ticks(0),
            busy_until: None,
        }
    }

    /// Move the board clock; returns `true` when a transmission just finished.
    fn advance(&mut self, now: Instant) -> bool {
        self.now = now;
        match self.busy_until {
            Some(until) if until <= now => {
                self.busy_until = None;
                true
            }
            _ => false,
        }
    }
}

impl Radio for SimBoard {
    fn is_ready(&self) -> bool {
        self.busy_until.is_none()
    }

    fn send(&mut self, payload: &UplinkPayload) {
        info!("Radio: transmitting {} bytes", payload.as_bytes().len());
        self.busy_until = Some(self.now + AIRTIME);
    }
}

impl Co2Module for SimBoard {
    fn calibrate(&mut self, mode: CalibrationMode) {
        info!("CO2 module: calibrate ({:?})", mode);
    }

    fn set_update_interval(&mut self, interval: Duration) {
        info!("CO2 module: update interval {} s", interval.as_secs());
    }
}

impl Leds for SimBoard {
    fn set_led(&mut self, led: Led, mode: LedMode) {
        info!("LED {:?}: {:?}", led, mode);
    }

    fn pulse_led(&mut self, led: Led, duration: Duration) {
        info!("LED {:?}: pulse {} ms", led, duration.as_millis());
    }
}

impl Display for SimBoard {
    fn is_ready(&self) -> bool {
        true
    }

    fn render(&mut self, frame: &Frame) {
        match frame {
            Frame::Page { rows, footer, .. } => {
                let mut text = String::new();
                for row in rows.iter().flatten() {
                    text.push_str(&format!(
                        "{}: {}{}  ",
                        row.label,
                        row.value.as_str(),
                        row.unit
                    ));
                }
                println!("[LCD] {}[{}]", text, footer.as_str());
            }
            Frame::Menu { item, footer } => {
                println!("[LCD] menu item {} [{}]", item, footer.as_str());
            }
        }
    }
}

impl Console for SimBoard {
    fn print_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Mock sensors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Source {
    HumidityTag,
    VocTag,
    Barometer,
    Co2,
    Battery,
}

struct MockSource {
    source: Source,
    interval: Duration,
    next: Instant,
    reads: u32,
}

/// Generates synthetic sensor reports at each sensor's native cadence.
struct MockSensors {
    sources: [MockSource; 5],
}

impl MockSensors {
    fn new(config: &NodeConfig, start: Instant) -> Self {
        let source = |source, interval_ms: u32| MockSource {
            source,
            interval: Duration::from_millis(interval_ms as u64),
            next: start,
            reads: 0,
        };
        Self {
            sources: [
                source(Source::HumidityTag, config.humidity_interval_ms),
                source(Source::VocTag, config.voc_interval_ms),
                source(Source::Barometer, config.pressure_interval_ms),
                source(Source::Co2, config.co2_interval_ms),
                source(Source::Battery, config.battery_interval_ms),
            ],
        }
    }

    fn next_due(&self) -> Option<Instant> {
        self.sources.iter().map(|s| s.next).min()
    }

    /// Reports of every sensor due at `now`.
    fn poll(&mut self, now: Instant) -> Vec<SensorUpdate> {
        let t = now.as_millis() as f64 / 1000.0;
        let mut updates = Vec::new();
        for source in self.sources.iter_mut().filter(|s| s.next <= now) {
            source.next = now + source.interval;
            source.reads += 1;
            updates.push(sample(source.source, source.reads, t));
        }
        updates
    }
}

fn sample(source: Source, reads: u32, t: f64) -> SensorUpdate {
    match source {
        // Temperature: 20-26 °C, humidity: 40-60 %
        Source::HumidityTag => SensorUpdate::HumidityTag {
            humidity: Ok((50.0 + 10.0 * (t / 1800.0).sin() + 2.0 * (t / 230.0).cos()) as f32),
            temperature: Ok((23.0 + 3.0 * (t / 3600.0).sin() + 0.5 * (t / 370.0).cos()) as f32),
        },
        Source::VocTag if reads % VOC_FAILURE_EVERY == 0 => {
            SensorUpdate::VocTag(Err(SensorError::ReadFailed { sensor: VOC_TAG }))
        }
        Source::VocTag => SensorUpdate::VocTag(Ok((150.0 + 100.0 * (t / 2400.0).sin()) as u16)),
        // 1005-1021 hPa, reported in Pa
        Source::Barometer => {
            SensorUpdate::Barometer(Ok((101_300.0 + 800.0 * (t / 7200.0).sin()) as f32))
        }
        // 400-800 ppm with a longer cycle
        Source::Co2 => {
            let ppm = 600.0 + 200.0 * (t / 3000.0).sin() + 30.0 * (t / 410.0).cos();
            SensorUpdate::Co2(Ok(ppm as f32))
        }
        // Slow discharge from full
        Source::Battery => {
            let charge = (100.0 - t / 3600.0).clamp(0.0, 100.0);
            SensorUpdate::Battery {
                voltage: Ok((2.4 + 0.9 * charge / 100.0) as f32),
                charge: Ok(charge as u8),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Console input
// ---------------------------------------------------------------------------

fn parse_input(line: &str) -> Option<NodeEvent> {
    let line = line.trim();
    if let Some(text) = line.strip_prefix("rx ") {
        let bytes = &text.as_bytes()[..text.len().min(MAX_DOWNLINK_LEN)];
        let message = heapless::Vec::from_slice(bytes).ok()?;
        return Some(NodeEvent::Radio(RadioEvent::MessageReceived(message)));
    }

    let event = match line {
        "p" => NodeEvent::Button(ButtonEvent::Previous),
        "n" => NodeEvent::Button(ButtonEvent::Next),
        "h2" => NodeEvent::Button(ButtonEvent::SecondaryHold),
        "h3" => NodeEvent::Button(ButtonEvent::TertiaryHold),
        "h4" => NodeEvent::Button(ButtonEvent::QuaternaryHold),
        "send" => NodeEvent::Command(Command::Send),
        "status" => NodeEvent::Command(Command::Status),
        other => NodeEvent::Command(Command::parse(other)?),
    };
    Some(event)
}

fn spawn_input_reader() {
    std::thread::spawn(|| {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if matches!(line.trim(), "q" | "quit") {
                break;
            }
            match parse_input(&line) {
                Some(event) => {
                    if NODE_EVENTS.try_send(event).is_err() {
                        warn!("Event queue full, input dropped");
                    }
                }
                None if line.trim().is_empty() => {}
                None => warn!("Unknown input: {}", line.trim()),
            }
        }
        QUIT.store(true, Ordering::Relaxed);
    });
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn speedup() -> u64 {
    std::env::var("SIM_SPEEDUP")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_SPEEDUP)
}

/// Deliver everything due at `now`: sensor reports, radio completion and
/// scheduled node tasks.
fn step(node: &mut NodeContext<SimBoard>, sensors: &mut MockSensors, now: Instant) {
    if node.board_mut().advance(now) {
        node.on_radio_event(RadioEvent::SendDone);
        node.on_radio_event(RadioEvent::Ready);
    }
    for update in sensors.poll(now) {
        node.on_sensor_update(update);
    }
    let ran = node.run_pending(now);
    if ran > 0 {
        debug!("Ran {} task(s) at {} ms", ran, now.as_millis());
    }
}

fn main() {
    env_logger::init();

    let speedup = speedup();
    let config = NodeConfig::default();
    let tick = Duration::from_millis(TICK.as_millis() as u64 * speedup);
    info!("Starting climate node simulator ({}x)", speedup);
    info!("Inputs: p n h2 h3 h4 send status 'rx <text>' q");

    let mut now = Instant::from_ticks(0);
    let mut node = match NodeContext::new(config, SimBoard::new(), now) {
        Ok(node) => node,
        Err(e) => {
            log::error!("Failed to start node: {}", e);
            return;
        }
    };
    let mut sensors = MockSensors::new(&config, now);

    node.on_radio_event(RadioEvent::JoinSuccess);
    spawn_input_reader();

    while !QUIT.load(Ordering::Relaxed) {
        while let Ok(event) = NODE_EVENTS.try_receive() {
            node.handle_event(event, now);
        }

        // Replay every due instant inside this tick in order.
        let target = now + tick;
        while let Some(due) = [
            sensors.next_due(),
            node.next_wakeup(),
            node.board().busy_until,
        ]
        .into_iter()
        .flatten()
        .filter(|due| *due <= target)
        .min()
        {
            now = due.max(now);
            step(&mut node, &mut sensors, now);
        }
        now = target;

        std::thread::sleep(TICK);
    }

    info!("Simulator exiting");
}

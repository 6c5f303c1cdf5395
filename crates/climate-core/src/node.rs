//! Node context
//!
//! [`NodeContext`] owns every piece of mutable node state: the aggregator,
//! the uplink encoder, the calibration session, the display navigator and
//! the task scheduler, plus the board it drives. The runtime calls into it
//! from one place only, which is what keeps the components free of locks.
//!
//! A runtime loop looks like:
//!
//! ```ignore
//! let mut node = NodeContext::new(NodeConfig::default(), board, Instant::now())?;
//! loop {
//!     while let Ok(event) = NODE_EVENTS.try_receive() {
//!         node.handle_event(event, Instant::now());
//!     }
//!     node.run_pending(Instant::now());
//!     // sleep until node.next_wakeup() or the next event
//! }
//! ```

use embassy_time::{Duration, Instant};
use log::{debug, error, info, warn};
use thiserror_no_std::Error;

use crate::aggregation::TelemetryAggregator;
use crate::calibration::CalibrationStateMachine;
use crate::config::{ConfigError, NodeConfig};
use crate::diagnostics;
use crate::display::{ButtonEvent, DisplayNavigator, NavEffect};
use crate::events::{Command, NodeEvent, RadioEvent};
use crate::hal::{Board, Display, Led, LedMode, Radio};
use crate::scheduler::{Scheduler, SchedulerError, TaskId};
use crate::sensors::{Reading, SensorUpdate};
use crate::uplink::UplinkEncoder;

/// Task slots: the uplink plus one calibration session, with headroom.
pub const TASK_SLOTS: usize = 4;

/// Work the node schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTask {
    Uplink,
    CalibrationStep,
}

pub type NodeScheduler = Scheduler<NodeTask, TASK_SLOTS>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeError {
    #[error("invalid configuration: {0}")]
    Config(ConfigError),
    #[error("failed to register uplink task: {0}")]
    Scheduler(SchedulerError),
}

impl From<ConfigError> for NodeError {
    fn from(e: ConfigError) -> Self {
        NodeError::Config(e)
    }
}

impl From<SchedulerError> for NodeError {
    fn from(e: SchedulerError) -> Self {
        NodeError::Scheduler(e)
    }
}

pub struct NodeContext<B: Board> {
    config: NodeConfig,
    aggregator: TelemetryAggregator,
    encoder: UplinkEncoder,
    calibration: CalibrationStateMachine,
    navigator: DisplayNavigator,
    scheduler: NodeScheduler,
    uplink: TaskId,
    board: B,
}

impl<B: Board> NodeContext<B> {
    /// Validate `config`, size the rolling windows and plan the first uplink.
    pub fn new(config: NodeConfig, board: B, now: Instant) -> Result<Self, NodeError> {
        config.validate()?;
        let aggregator = TelemetryAggregator::new(&config)?;

        let mut scheduler = NodeScheduler::new();
        let uplink = scheduler.register(NodeTask::Uplink, now + config.first_uplink_delay())?;

        info!(
            "Node started, first uplink in {} ms",
            config.first_uplink_delay_ms
        );

        Ok(Self {
            calibration: CalibrationStateMachine::new(&config),
            config,
            aggregator,
            encoder: UplinkEncoder::new(),
            navigator: DisplayNavigator::new(),
            scheduler,
            uplink,
            board,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn aggregator(&self) -> &TelemetryAggregator {
        &self.aggregator
    }

    pub fn calibration(&self) -> &CalibrationStateMachine {
        &self.calibration
    }

    pub fn navigator(&self) -> &DisplayNavigator {
        &self.navigator
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// When the uplink task is planned to run next.
    pub fn uplink_due(&self) -> Option<Instant> {
        self.scheduler.due(self.uplink)
    }

    /// Earliest instant at which [`run_pending`](Self::run_pending) has work.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Run every task due at `now`. Returns how many ran.
    pub fn run_pending(&mut self, now: Instant) -> usize {
        let mut ran = 0;
        while let Some((task, kind)) = self.scheduler.pop_due(now) {
            match kind {
                NodeTask::Uplink => self.run_uplink(task, now),
                NodeTask::CalibrationStep => {
                    let Self {
                        calibration,
                        scheduler,
                        board,
                        ..
                    } = self;
                    calibration.tick(task, scheduler, now, board);
                }
            }
            ran += 1;
        }
        ran
    }

    pub fn handle_event(&mut self, event: NodeEvent, now: Instant) {
        match event {
            NodeEvent::Button(button) => self.on_button(button, now),
            NodeEvent::Radio(radio) => self.on_radio_event(radio),
            NodeEvent::Command(command) => self.on_command(command, now),
            NodeEvent::Sensor(update) => self.on_sensor_update(update),
        }
    }

    pub fn on_humidity_tag(&mut self, humidity: Reading<f32>, temperature: Reading<f32>) {
        self.on_sensor_update(SensorUpdate::HumidityTag {
            humidity,
            temperature,
        });
    }

    pub fn on_voc_tag(&mut self, ppb: Reading<u16>) {
        self.on_sensor_update(SensorUpdate::VocTag(ppb));
    }

    pub fn on_barometer_tag(&mut self, pascal: Reading<f32>) {
        self.on_sensor_update(SensorUpdate::Barometer(pascal));
    }

    pub fn on_co2_module(&mut self, ppm: Reading<f32>) {
        self.on_sensor_update(SensorUpdate::Co2(ppm));
    }

    pub fn on_battery_module(&mut self, voltage: Reading<f32>, charge: Reading<u8>) {
        self.on_sensor_update(SensorUpdate::Battery { voltage, charge });
    }

    /// Feed each valid reading of `update` and refresh the display.
    ///
    /// Failed readings are logged and dropped; they never affect other
    /// metrics of the same report.
    pub fn on_sensor_update(&mut self, update: SensorUpdate) {
        let source = update.source();
        for (metric, reading) in update.readings() {
            match reading {
                Ok(value) => {
                    debug!("{}", diagnostics::reading_line(source, metric, value));
                    self.aggregator.feed(metric, value);
                    self.navigator.set_live(metric, value);
                    self.redraw();
                }
                Err(e) => debug!(
                    "{}: Invalid {} value ({})",
                    source,
                    metric.status_name(),
                    e
                ),
            }
        }
    }

    pub fn on_button(&mut self, event: ButtonEvent, now: Instant) {
        match self.navigator.handle_button(event) {
            NavEffect::Redraw => self.redraw(),
            NavEffect::Activity => {
                self.board.set_led(Led::Green, LedMode::On);
                self.plan_uplink_now(now);
                self.redraw();
            }
            NavEffect::ToggleCalibration => {
                let Self {
                    calibration,
                    scheduler,
                    board,
                    ..
                } = self;
                calibration.toggle(scheduler, now, board);
            }
            NavEffect::PulseIndicator => {
                let pulse = self.config.indicator_pulse();
                self.board.pulse_led(Led::Red, pulse);
            }
        }
    }

    pub fn on_radio_event(&mut self, event: RadioEvent) {
        match event {
            RadioEvent::Error => {
                warn!("Radio error");
                self.board.set_led(Led::Red, LedMode::BlinkFast);
            }
            RadioEvent::SendStarted => {}
            RadioEvent::SendDone => {
                self.board.set_led(Led::Red, LedMode::Off);
                self.board.set_led(Led::Green, LedMode::Off);
            }
            RadioEvent::Ready => self.board.set_led(Led::Red, LedMode::Off),
            RadioEvent::JoinSuccess => {
                info!("Joined network");
                self.board.print_line(diagnostics::JOIN_OK);
            }
            RadioEvent::JoinError => {
                warn!("Network join failed");
                self.board.print_line(diagnostics::JOIN_ERROR);
            }
            RadioEvent::MessageReceived(message) => {
                debug!("Downlink of {} bytes", message.len());
                if let Some(line) = diagnostics::received_line(&message) {
                    self.board.print_line(line.as_str());
                }
            }
        }
    }

    pub fn on_command(&mut self, command: Command, now: Instant) {
        match command {
            Command::Send => self.plan_uplink_now(now),
            Command::Status => {
                let snapshot = self.aggregator.snapshot();
                for line in diagnostics::status_lines(&snapshot) {
                    self.board.print_line(line.as_str());
                }
            }
        }
    }

    fn plan_uplink_now(&mut self, now: Instant) {
        if let Err(e) = self.scheduler.plan_now(self.uplink, now) {
            error!("Failed to plan uplink: {}", e);
        }
    }

    fn run_uplink(&mut self, task: TaskId, now: Instant) {
        if !Radio::is_ready(&self.board) {
            debug!(
                "Radio busy, retrying uplink in {} ms",
                self.config.radio_retry_ms
            );
            self.replan_uplink(task, now, self.config.radio_retry());
            return;
        }

        let snapshot = self.aggregator.snapshot();
        let payload = self.encoder.encode(&snapshot);
        self.board.send(&payload);
        let line = diagnostics::send_line(&payload);
        self.board.print_line(line.as_str());
        info!("Uplink sent: {}", payload.to_hex());

        self.redraw();
        self.replan_uplink(task, now, self.config.uplink_interval());
    }

    fn replan_uplink(&mut self, task: TaskId, now: Instant, delay: Duration) {
        if let Err(e) = self.scheduler.plan_relative(task, now, delay) {
            error!("Failed to re-plan uplink: {}", e);
        }
    }

    fn redraw(&mut self) {
        if Display::is_ready(&self.board) {
            let frame = self.navigator.frame();
            self.board.render(&frame);
        }
    }
}

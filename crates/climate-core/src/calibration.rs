//! CO2 background calibration
//!
//! A session runs a fixed number of one-minute calibration steps after an
//! initial settling delay:
//!
//! ```text
//! Idle --start--> ArmedDelay --tick--> Calibrating(n) --tick--> ... --> Idle
//!   ^                 |                     |
//!   +------stop-------+---------stop--------+
//! ```
//!
//! The session owns the handle of its own scheduled step. Stopping the
//! session unregisters that handle, so a step that was already planned can
//! never run after cancellation.

use embassy_time::{Duration, Instant};
use log::{debug, error, info, warn};

use crate::config::NodeConfig;
use crate::hal::{CalibrationMode, Co2Module, Led, LedMode, Leds};
use crate::node::{NodeScheduler, NodeTask};
use crate::scheduler::TaskId;

/// LED used to show calibration progress.
const INDICATOR: Led = Led::Blue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    Idle,
    /// Session started, waiting for the settling delay to elapse
    ArmedDelay { remaining: u8 },
    /// At least one step issued, `remaining` steps left
    Calibrating { remaining: u8 },
}

#[derive(Debug, Clone, Copy)]
struct CalibrationSession {
    task: TaskId,
    remaining: u8,
    started: bool,
}

#[derive(Debug)]
pub struct CalibrationStateMachine {
    session: Option<CalibrationSession>,
    cycles: u8,
    delay: Duration,
    step: Duration,
    normal_interval: Duration,
    service_interval: Duration,
}

impl CalibrationStateMachine {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            session: None,
            cycles: config.calibration_cycles,
            delay: config.calibration_delay(),
            step: config.calibration_step(),
            normal_interval: config.co2_interval(),
            service_interval: config.co2_service_interval(),
        }
    }

    pub fn state(&self) -> CalibrationState {
        match self.session {
            None => CalibrationState::Idle,
            Some(s) if s.started => CalibrationState::Calibrating {
                remaining: s.remaining,
            },
            Some(s) => CalibrationState::ArmedDelay {
                remaining: s.remaining,
            },
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Handle of the pending calibration step, if a session exists.
    pub fn task(&self) -> Option<TaskId> {
        self.session.map(|s| s.task)
    }

    /// Begin a session. Does nothing if one is already running.
    ///
    /// Returns whether a new session was started.
    pub fn start<B: Co2Module + Leds>(
        &mut self,
        scheduler: &mut NodeScheduler,
        now: Instant,
        board: &mut B,
    ) -> bool {
        if self.session.is_some() {
            debug!("CO2 calibration already running");
            return false;
        }

        let task = match scheduler.register(NodeTask::CalibrationStep, now + self.delay) {
            Ok(task) => task,
            Err(e) => {
                error!("Failed to schedule CO2 calibration: {}", e);
                return false;
            }
        };

        self.session = Some(CalibrationSession {
            task,
            remaining: self.cycles,
            started: false,
        });
        board.set_led(INDICATOR, LedMode::BlinkSlow);
        info!("Start CO2 calibration");
        true
    }

    /// Run one calibration step. Called by the scheduler when `task` is due.
    pub fn tick<B: Co2Module + Leds>(
        &mut self,
        task: TaskId,
        scheduler: &mut NodeScheduler,
        now: Instant,
        board: &mut B,
    ) {
        let Some(session) = self.session.as_mut().filter(|s| s.task == task) else {
            warn!("Ignoring calibration step without a matching session");
            return;
        };

        board.set_led(INDICATOR, LedMode::BlinkFast);
        debug!("CO2 calibration {}", session.remaining);

        board.set_update_interval(self.service_interval);
        board.calibrate(CalibrationMode::BackgroundFiltered);

        session.started = true;
        session.remaining = session.remaining.saturating_sub(1);

        if session.remaining == 0 {
            self.stop(scheduler, board);
            return;
        }

        if let Err(e) = scheduler.plan_relative(task, now, self.step) {
            error!("Failed to plan next calibration step: {}", e);
            self.stop(scheduler, board);
        }
    }

    /// End the running session, cancelling its pending step.
    ///
    /// Returns `false` if no session was running.
    pub fn stop<B: Co2Module + Leds>(
        &mut self,
        scheduler: &mut NodeScheduler,
        board: &mut B,
    ) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };

        board.set_led(INDICATOR, LedMode::Off);
        scheduler.unregister(session.task);
        board.set_update_interval(self.normal_interval);
        info!("Stop CO2 calibration");
        true
    }

    /// Start a session if none exists, otherwise stop the running one.
    pub fn toggle<B: Co2Module + Leds>(
        &mut self,
        scheduler: &mut NodeScheduler,
        now: Instant,
        board: &mut B,
    ) {
        if self.session.is_some() {
            self.stop(scheduler, board);
        } else {
            self.start(scheduler, now, board);
        }
    }
}

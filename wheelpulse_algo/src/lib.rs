#![cfg_attr(not(test), no_std)]

// fmt must come first: it defines the logging macros used by the other modules
#[macro_use]
mod fmt;

pub mod config;
pub mod drive;
pub mod math_float;
pub mod pulse_capture;
pub mod telemetry;

pub use config::{ConfigError, ControllerConfig};
pub use drive::{DriveCommand, DriveState};
pub use pulse_capture::{timestamp_prescaler, PulseCapture, PulseSample, TIMESTAMP_HZ};
pub use telemetry::Telemetry;

use drive::DeadbandDrive;
use math_float::controllers::pid::PID;
use math_float::filters::{FilterState, SignalFilters};

/// Position control loop: command pulse in, H-bridge drive command out.
///
/// Owns every piece of state that persists between ticks (filters, PID, timing)
/// so nothing lives in globals except the interrupt handoff in `PulseCapture`.
pub struct ControlLoop {
    config: ControllerConfig,
    filters: SignalFilters,
    pid: PID,
    drive: DeadbandDrive,

    last_tick: Option<u32>, // Time of the last executed tick, ms
    has_command: bool,      // At least one pulse was captured since start-up
    stale_ticks: u32,       // Executed ticks since the last fresh pulse
    stale_reported: bool,   // Stale warning already logged for this episode

    telemetry: Telemetry,
}

impl ControlLoop {
    /// Validates `config` and builds the loop with cleared filters and PID.
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        info!(
            "CONTROL: period {}ms, PID {}ms, deadband {}",
            config.control_period_ms,
            config.pid_sample_ms,
            config.deadband
        );

        Ok(Self {
            filters: SignalFilters::new(config.lpf_alpha, config.hpf_alpha),
            pid: PID::new(config.gains, config.pid_sample_ms, config.output_limits),
            drive: DeadbandDrive::new(config.deadband, config.drive_max),
            last_tick: None,
            has_command: false,
            stale_ticks: 0,
            stale_reported: false,
            telemetry: Telemetry::default(),
            config,
        })
    }

    /// Main update method.
    ///
    /// # Arguments
    /// * `now_ms` - free-running millisecond counter (wrap-around is handled)
    /// * `read_sensor` - returns the raw position sensor reading, called once per executed tick
    /// * `pulse` - command pulse handoff filled by the edge interrupt
    ///
    /// Returns `None` when called before a full control period elapsed since the
    /// previous executed tick; the sensor is not read and nothing is updated in
    /// that case. Missed periods are not caught up.
    pub fn tick<F>(
        &mut self,
        now_ms: u32,
        read_sensor: F,
        pulse: &PulseCapture,
    ) -> Option<DriveCommand>
    where
        F: FnOnce() -> u16,
    {
        if let Some(last) = self.last_tick {
            if now_ms.wrapping_sub(last) < self.config.control_period_ms {
                return None;
            }
        }
        self.last_tick = Some(now_ms);

        let sensor_raw = read_sensor();
        let sample = pulse.take();
        self.track_signal(sample);

        let command = if self.has_command {
            self.regulate(sample.width_us, sensor_raw, now_ms)
        } else {
            // Nothing to track until the first pulse arrives
            DriveCommand::STOP
        };

        self.telemetry = Telemetry {
            sensor_raw,
            pulse_filtered: self.filters.low_pass(),
            pulse_high_pass: self.filters.high_pass(),
            pulse_raw_us: sample.width_us,
            pid_output: self.pid.output(),
            drive: command,
            stale_ticks: self.stale_ticks,
        };
        trace!("CONTROL: {}", self.telemetry);

        Some(command)
    }

    /// Filters the command, maps both sides into the control range and runs PID + deadband.
    fn regulate(&mut self, width_us: u32, sensor_raw: u16, now_ms: u32) -> DriveCommand {
        let filtered = self.filters.tick(width_us as f32);

        let setpoint = self
            .config
            .command_range
            .map_to(filtered.low_pass, &self.config.control_range);
        let measured = self
            .config
            .sensor_range
            .map_to(sensor_raw as f32, &self.config.control_range);

        self.pid.set_target(setpoint);
        self.pid.set_measurement(measured);
        let output = self.pid.compute(now_ms);

        self.drive.tick(output)
    }

    /// Updates the signal bookkeeping. A lost signal keeps the last width in use.
    fn track_signal(&mut self, sample: PulseSample) {
        if sample.valid {
            if !self.has_command {
                info!("PULSE: first command {}us", sample.width_us);
                self.has_command = true;
                // Start the filters on the first width instead of ramping up from zero
                self.filters.reset(sample.width_us as f32);
            } else if self.stale_reported {
                info!("PULSE: signal back after {} ticks", self.stale_ticks);
            }
            self.stale_ticks = 0;
            self.stale_reported = false;
        } else {
            self.stale_ticks = self.stale_ticks.saturating_add(1);
            if self.has_command
                && !self.stale_reported
                && self.stale_ticks >= self.config.stale_after_ticks
            {
                warn!(
                    "PULSE: no fresh pulse for {} ticks, holding {}us",
                    self.stale_ticks,
                    sample.width_us
                );
                self.stale_reported = true;
            }
        }
    }

    /// Snapshot of the last executed tick.
    pub fn telemetry(&self) -> Telemetry {
        self.telemetry
    }

    /// Current filter registers.
    pub fn filter_state(&self) -> FilterState {
        self.filters.state()
    }

    /// Last PID output.
    pub fn pid_output(&self) -> f32 {
        self.pid.output()
    }

    /// Last emitted drive command.
    pub fn drive_command(&self) -> DriveCommand {
        self.telemetry.drive
    }

    /// True once a first command pulse was captured.
    pub fn has_command(&self) -> bool {
        self.has_command
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

// Implements the start-up configuration of the position controller: every tuning
// constant in one structure, validated once before the control loop is built.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use thiserror::Error;

use crate::math_float::controllers::pid::PidGains;
use crate::math_float::mapping::ControlRange;

/// Rejected configuration, reported once at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A mapping source range has no span
    #[error("range `{0}` has min == max or a non-finite bound")]
    DegenerateRange(&'static str),
    /// Output limits must satisfy min < max
    #[error("output limits are inverted or empty")]
    InvertedLimits,
    /// Filter smoothing factor outside (0, 1]
    #[error("smoothing factor `{0}` is outside (0, 1]")]
    InvalidSmoothing(&'static str),
    /// Control period or PID sample period is zero
    #[error("period `{0}` must be at least 1 ms")]
    ZeroPeriod(&'static str),
    /// Deadband threshold negative or not finite
    #[error("deadband threshold must be finite and >= 0")]
    NegativeDeadband,
    /// PID gain not finite
    #[error("PID gain `{0}` is not finite")]
    InvalidGain(&'static str),
    /// Drive channel ceiling is zero
    #[error("drive magnitude ceiling must be > 0")]
    ZeroDriveMax,
}

/// Tuning constants of the controller, fixed at start-up.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// PID gains
    pub gains: PidGains,
    /// Minimum time between two PID computations, ms
    pub pid_sample_ms: u32,
    /// Control tick period, ms
    pub control_period_ms: u32,
    /// Corrections with a magnitude below this value stop the motor
    pub deadband: f32,
    /// Raw position sensor range
    pub sensor_range: ControlRange,
    /// Command pulse width range, us
    pub command_range: ControlRange,
    /// Shared range the setpoint and the measurement are mapped into
    pub control_range: ControlRange,
    /// PID output bounds
    pub output_limits: ControlRange,
    /// Ceiling of one drive channel magnitude
    pub drive_max: u16,
    /// Low-pass smoothing factor for the command pulse width
    pub lpf_alpha: f32,
    /// High-pass smoothing factor for the command pulse width
    pub hpf_alpha: f32,
    /// Ticks without a fresh pulse before the signal is reported stale (log only)
    pub stale_after_ticks: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            gains: PidGains {
                kp: 2.0,
                ki: 0.5,
                kd: 0.05,
            },
            pid_sample_ms: 50,
            control_period_ms: 50,
            deadband: 10.0,
            sensor_range: ControlRange::new(0.0, 400.0),
            command_range: ControlRange::new(1000.0, 2000.0),
            control_range: ControlRange::new(-255.0, 255.0),
            output_limits: ControlRange::new(-255.0, 255.0),
            drive_max: 255,
            lpf_alpha: 0.2,
            hpf_alpha: 0.5,
            stale_after_ticks: 20,
        }
    }
}

impl ControllerConfig {
    /// Checks every constant the control loop divides by, clamps with or filters with.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !self.sensor_range.is_mappable() {
            return Err(ConfigError::DegenerateRange("sensor_range"));
        }
        if !self.command_range.is_mappable() {
            return Err(ConfigError::DegenerateRange("command_range"));
        }
        if !self.control_range.min.is_finite() || !self.control_range.max.is_finite() {
            return Err(ConfigError::DegenerateRange("control_range"));
        }

        let limits = self.output_limits;
        if !(limits.min.is_finite() && limits.max.is_finite() && limits.min < limits.max) {
            return Err(ConfigError::InvertedLimits);
        }

        Self::check_alpha(self.lpf_alpha, "lpf_alpha")?;
        Self::check_alpha(self.hpf_alpha, "hpf_alpha")?;

        if self.control_period_ms == 0 {
            return Err(ConfigError::ZeroPeriod("control_period_ms"));
        }
        if self.pid_sample_ms == 0 {
            return Err(ConfigError::ZeroPeriod("pid_sample_ms"));
        }

        if !(self.deadband.is_finite() && self.deadband >= 0.0) {
            return Err(ConfigError::NegativeDeadband);
        }

        Self::check_gain(self.gains.kp, "kp")?;
        Self::check_gain(self.gains.ki, "ki")?;
        Self::check_gain(self.gains.kd, "kd")?;

        if self.drive_max == 0 {
            return Err(ConfigError::ZeroDriveMax);
        }

        Ok(self)
    }

    #[inline]
    fn check_alpha(alpha: f32, name: &'static str) -> Result<(), ConfigError> {
        // NaN fails both comparisons
        if alpha > 0.0 && alpha <= 1.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidSmoothing(name))
        }
    }

    #[inline]
    fn check_gain(gain: f32, name: &'static str) -> Result<(), ConfigError> {
        if gain.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::InvalidGain(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_config_is_valid() {
        let config = ControllerConfig::default();
        assert_eq!(config.validate(), Ok(config));
    }

    #[rstest]
    #[case(0.0, Err(ConfigError::InvalidSmoothing("lpf_alpha")))]
    #[case(-0.1, Err(ConfigError::InvalidSmoothing("lpf_alpha")))]
    #[case(1.5, Err(ConfigError::InvalidSmoothing("lpf_alpha")))]
    #[case(f32::NAN, Err(ConfigError::InvalidSmoothing("lpf_alpha")))]
    #[case(1.0, Ok(()))]
    #[case(0.01, Ok(()))]
    fn low_pass_alpha_bounds(#[case] alpha: f32, #[case] expected: Result<(), ConfigError>) {
        let config = ControllerConfig {
            lpf_alpha: alpha,
            ..Default::default()
        };
        assert_eq!(config.validate().map(|_| ()), expected);
    }

    #[test]
    fn degenerate_sensor_range_rejected() {
        let config = ControllerConfig {
            sensor_range: ControlRange::new(200.0, 200.0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DegenerateRange("sensor_range"))
        );
    }

    #[test]
    fn degenerate_command_range_rejected() {
        let config = ControllerConfig {
            command_range: ControlRange::new(1500.0, 1500.0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DegenerateRange("command_range"))
        );
    }

    #[rstest]
    #[case(ControlRange::new(255.0, -255.0))]
    #[case(ControlRange::new(10.0, 10.0))]
    #[case(ControlRange::new(f32::NEG_INFINITY, 10.0))]
    fn output_limits_must_be_ordered(#[case] limits: ControlRange) {
        let config = ControllerConfig {
            output_limits: limits,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvertedLimits));
    }

    #[test]
    fn zero_periods_rejected() {
        let config = ControllerConfig {
            control_period_ms: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroPeriod("control_period_ms"))
        );

        let config = ControllerConfig {
            pid_sample_ms: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroPeriod("pid_sample_ms"))
        );
    }

    #[test]
    fn remaining_checks() {
        let config = ControllerConfig {
            deadband: -1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NegativeDeadband));

        let mut config = ControllerConfig::default();
        config.gains.kd = f32::INFINITY;
        assert_eq!(config.validate(), Err(ConfigError::InvalidGain("kd")));

        let config = ControllerConfig {
            drive_max: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDriveMax));
    }

    #[test]
    fn error_messages_name_the_field() {
        let msg = ConfigError::DegenerateRange("sensor_range").to_string();
        assert!(msg.contains("sensor_range"));
    }
}

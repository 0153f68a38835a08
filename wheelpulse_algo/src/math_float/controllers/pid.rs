// Implements a floating-point PID controller with a fixed sample period, turning the
// mapped command setpoint and the mapped position measurement into a bounded correction.

// Key Features:
// - Configurable proportional, integral and derivative gains.
// - Sample-period gate: compute() recalculates only once a full period has elapsed.
// - Integral kept in output units and clamped to the output bounds (anti-windup).
// - Output always within [out_min, out_max].

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::math_float::mapping::ControlRange;

/// Proportional, integral and derivative gains.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

/// Implements the PID controller for position correction.
pub struct PID {
    kp: f32,             // Proportional gain.
    ki: f32,             // Integral gain, per second.
    kd: f32,             // Derivative gain, seconds.
    sample_ms: u32,      // Minimum time between two computations.
    limits: ControlRange, // Output bounds, also bound the integral.

    setpoint: f32,       // Target written before each compute.
    input: f32,          // Measurement written before each compute.
    integral: f32,       // Accumulated ki-weighted error, in output units.
    previous_error: f32, // Previous error value for derivative calculation.
    output: f32,         // Current output of the PID controller.
    last_compute: Option<u32>, // Timestamp of the last successful compute.
}

impl PID {
    /// Creates a new PID controller with specified gains, sample period and output bounds.
    pub fn new(gains: PidGains, sample_ms: u32, limits: ControlRange) -> Self {
        Self {
            kp: gains.kp,
            ki: gains.ki,
            kd: gains.kd,
            sample_ms,
            limits,
            setpoint: 0.0,
            input: 0.0,
            integral: 0.0,
            previous_error: 0.0,
            output: 0.0,
            last_compute: None,
        }
    }

    pub fn set_target(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
    }

    pub fn set_measurement(&mut self, input: f32) {
        self.input = input;
    }

    /// Recomputes the output if at least one sample period passed since the last
    /// computation, otherwise returns the previous output unchanged.
    ///
    /// `now_ms` is a free-running millisecond counter, wrap-around is handled.
    pub fn compute(&mut self, now_ms: u32) -> f32 {
        let first = match self.last_compute {
            Some(last) if now_ms.wrapping_sub(last) < self.sample_ms => return self.output,
            Some(_) => false,
            None => true,
        };
        self.last_compute = Some(now_ms);

        let dt = self.sample_ms as f32 / 1000.0;
        let error = self.setpoint - self.input;

        // Calculate proportional term
        let p = self.kp * error;

        // Accumulate integral in output units and clamp it to the output bounds
        self.integral = self.limits.clamp(self.integral + self.ki * error * dt);

        // Calculate derivative term, no history on the very first computation
        let d = if first {
            0.0
        } else {
            self.kd * (error - self.previous_error) / dt
        };

        // Update previous error for the next calculation
        self.previous_error = error;

        let output = self.limits.clamp(p + self.integral + d);
        if output != self.output && (output == self.limits.min || output == self.limits.max) {
            debug!("PID: saturated at {}", output);
        }
        self.output = output;
        self.output
    }

    /// Retrieves the current output of the PID controller.
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Last target passed to `set_target`.
    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    /// Last measurement passed to `set_measurement`.
    pub fn measurement(&self) -> f32 {
        self.input
    }

    /// Clears the integral, derivative history and the sample-period gate.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
        self.output = 0.0;
        self.last_compute = None;
    }
}

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::drive::DriveCommand;

/// Read-only snapshot of one executed control tick, for a diagnostic sink.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Telemetry {
    /// Raw position sensor reading
    pub sensor_raw: u16,
    /// Low-pass filtered command pulse width, us
    pub pulse_filtered: f32,
    /// High-pass filtered command pulse width (diagnostic only)
    pub pulse_high_pass: f32,
    /// Latest raw command pulse width, us (may be stale)
    pub pulse_raw_us: u32,
    /// PID correction before the deadband
    pub pid_output: f32,
    /// Command emitted to the H-bridge
    pub drive: DriveCommand,
    /// Executed ticks since the last fresh pulse sample
    pub stale_ticks: u32,
}

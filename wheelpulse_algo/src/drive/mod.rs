// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

pub mod deadband;

pub use deadband::DeadbandDrive;

/// Direction the H-bridge is driven in for the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveState {
    STOPPED,
    FORWARD,
    REVERSE,
}

/// Magnitudes for the two half-bridge enables.
///
/// At most one of the two is non-zero: driving both legs at once would short
/// the bridge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveCommand {
    forward: u16,
    reverse: u16,
}

impl DriveCommand {
    /// Both channels at zero.
    pub const STOP: DriveCommand = DriveCommand {
        forward: 0,
        reverse: 0,
    };

    pub const fn forward(magnitude: u16) -> Self {
        Self {
            forward: magnitude,
            reverse: 0,
        }
    }

    pub const fn reverse(magnitude: u16) -> Self {
        Self {
            forward: 0,
            reverse: magnitude,
        }
    }

    pub fn forward_magnitude(&self) -> u16 {
        self.forward
    }

    pub fn reverse_magnitude(&self) -> u16 {
        self.reverse
    }

    /// Channel values as `[forward, reverse]`, ready to be written to the timer.
    pub fn channels(&self) -> [u16; 2] {
        [self.forward, self.reverse]
    }

    pub fn state(&self) -> DriveState {
        if self.forward > 0 {
            DriveState::FORWARD
        } else if self.reverse > 0 {
            DriveState::REVERSE
        } else {
            DriveState::STOPPED
        }
    }
}

// Implements the deadband and direction logic that turns the signed PID correction
// into the two unsigned H-bridge drive magnitudes.

// Key Features:
// - Corrections below the deadband threshold stop the motor
// - Positive corrections drive the forward channel, negative the reverse channel
// - Stateless: every tick starts from the latest correction only

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use super::{DriveCommand, DriveState};

/// Deadband filter and direction selector for the H-bridge.
pub struct DeadbandDrive {
    threshold: f32, // Corrections with |output| below this value are forced to zero
    max: u16,       // Ceiling for a single channel magnitude
}

impl DeadbandDrive {
    pub fn new(threshold: f32, max: u16) -> Self {
        Self { threshold, max }
    }

    /// Converts a signed correction into a drive command.
    pub fn tick(&self, output: f32) -> DriveCommand {
        let magnitude = libm::fabsf(output);

        match Self::select(magnitude, output, self.threshold) {
            DriveState::STOPPED => DriveCommand::STOP,
            DriveState::FORWARD => DriveCommand::forward(self.to_duty(magnitude)),
            DriveState::REVERSE => DriveCommand::reverse(self.to_duty(magnitude)),
        }
    }

    /// Applies the deadband: the correction that actually reaches the bridge.
    pub fn effective_output(&self, output: f32) -> f32 {
        if libm::fabsf(output) < self.threshold {
            0.0
        } else {
            output
        }
    }

    #[inline(always)]
    fn select(magnitude: f32, output: f32, threshold: f32) -> DriveState {
        if magnitude < threshold || output == 0.0 || output.is_nan() {
            DriveState::STOPPED
        } else if output > 0.0 {
            DriveState::FORWARD
        } else {
            DriveState::REVERSE
        }
    }

    #[inline(always)]
    fn to_duty(&self, magnitude: f32) -> u16 {
        // Float to int casts saturate, the ceiling is applied on top
        (magnitude as u16).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(3.0)]
    #[case(-4.0)]
    #[case(4.999)]
    #[case(0.0)]
    #[case(-0.0)]
    fn inside_deadband_stops(#[case] output: f32) {
        let drive = DeadbandDrive::new(5.0, 255);
        let cmd = drive.tick(output);
        assert_eq!(cmd, DriveCommand::STOP);
        assert_eq!(cmd.state(), DriveState::STOPPED);
        assert_eq!(drive.effective_output(output), 0.0);
    }

    #[rstest]
    #[case(5.0, 5, 0)]
    #[case(120.7, 120, 0)]
    #[case(-5.0, 0, 5)]
    #[case(-200.0, 0, 200)]
    #[case(1000.0, 255, 0)]
    #[case(-1000.0, 0, 255)]
    fn outside_deadband_drives_one_channel(
        #[case] output: f32,
        #[case] forward: u16,
        #[case] reverse: u16,
    ) {
        let drive = DeadbandDrive::new(5.0, 255);
        let cmd = drive.tick(output);
        assert_eq!(cmd.forward_magnitude(), forward);
        assert_eq!(cmd.reverse_magnitude(), reverse);
    }

    #[test]
    fn never_drives_both_channels() {
        let drive = DeadbandDrive::new(5.0, 255);
        let mut output = -400.0f32;
        while output <= 400.0 {
            let [fwd, rev] = drive.tick(output).channels();
            assert!(fwd == 0 || rev == 0, "both channels set for {}", output);
            output += 0.25;
        }
        let [fwd, rev] = drive.tick(f32::NAN).channels();
        assert_eq!((fwd, rev), (0, 0));
    }

    #[test]
    fn stop_after_drive_clears_both_channels() {
        let drive = DeadbandDrive::new(5.0, 255);
        assert_eq!(drive.tick(-90.0).state(), DriveState::REVERSE);
        assert_eq!(drive.tick(2.0).channels(), [0, 0]);
    }
}

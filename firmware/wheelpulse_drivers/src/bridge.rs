// Drives the two half-bridge PWM inputs of the motor H-bridge from a DriveCommand.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    clocks::Clocks,
    gpio::Pin,
    pac::TIM3,
    timer::{
        Alignment, CaptureCompareDma, CountDir, OutputCompare, TimChannel, Timer, TimerConfig,
        UpdateReqSrc,
    },
};

use wheelpulse_algo::DriveCommand;

use super::pinout;

const CH_FWD: TimChannel = TimChannel::C1;
const CH_REV: TimChannel = TimChannel::C2;

pub struct HBridge {
    tim: Timer<TIM3>,
    enable: Pin,
    drive_max: u16,
}

impl HBridge {
    /// Sets up TIM3 at `freq` Hz with both channels at zero duty and the bridge disabled.
    ///
    /// `drive_max` is the magnitude that maps to 100% duty.
    pub fn new(tim3: TIM3, clock_cfg: &Clocks, freq: u32, drive_max: u16) -> Self {
        let mut timer = Timer::new_tim3(
            tim3,
            freq as f32,
            TimerConfig {
                one_pulse_mode: false,
                update_request_source: UpdateReqSrc::Any,
                auto_reload_preload: true,
                alignment: Alignment::Edge,
                capture_compare_dma: CaptureCompareDma::Update,
                direction: CountDir::Up,
            },
            clock_cfg,
        );

        // Enable PWM outputs with initial duty cycle 0.0 before muxing the pins
        timer.enable_pwm_output(CH_FWD, OutputCompare::Pwm1, 0.0);
        timer.enable_pwm_output(CH_REV, OutputCompare::Pwm1, 0.0);
        timer.enable();

        pinout::bridge::PWM_FWD.init();
        pinout::bridge::PWM_REV.init();

        let mut enable = pinout::bridge::ENABLE.init();
        enable.set_low();

        HBridge {
            tim: timer,
            enable,
            drive_max,
        }
    }

    pub fn begin(&mut self) {
        self.enable.set_high();
    }

    /// Writes both channels. The channel being released is written first so the
    /// two legs never overlap during a direction change.
    pub fn apply_drive(&mut self, cmd: DriveCommand) {
        let period = self.tim.get_max_duty();
        let fwd = Self::duty2period(cmd.forward_magnitude(), self.drive_max, period);
        let rev = Self::duty2period(cmd.reverse_magnitude(), self.drive_max, period);

        if fwd == 0 {
            self.tim.set_duty(CH_FWD, 0);
            self.tim.set_duty(CH_REV, rev);
        } else {
            self.tim.set_duty(CH_REV, 0);
            self.tim.set_duty(CH_FWD, fwd);
        }
    }

    fn duty2period(magnitude: u16, drive_max: u16, period: u32) -> u32 {
        let magnitude = magnitude.min(drive_max) as u32;
        magnitude * period / drive_max as u32
    }
}

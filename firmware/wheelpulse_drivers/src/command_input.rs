// Edge-timed RC command input: EXTI on the receiver pin plus TIM2 running free at 1 MHz.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    clocks::Clocks,
    gpio::{self, Edge, Pin, Pull},
    pac::TIM2,
    timer::{
        Alignment, CaptureCompareDma, CountDir, Timer, TimerConfig, UpdateReqSrc,
    },
};

use wheelpulse_algo::timestamp_prescaler;

use super::pinout;

/// Microsecond time base shared by the edge interrupt.
pub struct CommandInput {
    pin: Pin,
    tim: Timer<TIM2>,
}

impl CommandInput {
    pub fn new(tim2: TIM2, clock_cfg: &Clocks) -> Self {
        let mut timer = Timer::new_tim2(
            tim2,
            1.0, // Overwritten below: TIM2 only serves as a 32-bit free-running counter
            TimerConfig {
                one_pulse_mode: false,
                update_request_source: UpdateReqSrc::Any,
                auto_reload_preload: false,
                alignment: Alignment::Edge,
                capture_compare_dma: CaptureCompareDma::Update,
                direction: CountDir::Up,
            },
            clock_cfg,
        );
        // One count per microsecond, wrap at u32::MAX
        timer.set_prescaler(timestamp_prescaler(clock_cfg.apb1_timer()));
        timer.set_auto_reload(u32::MAX);
        // PSC is buffered: force an update event so the new prescaler is loaded
        timer.reinitialize();
        timer.reset_count();
        timer.enable();

        let mut pin = pinout::command::RC_IN.init();
        pin.pull(Pull::Dn);
        pin.enable_interrupt(Edge::Either);

        CommandInput { pin, tim: timer }
    }

    /// Clears the EXTI flag and returns the pin level after the edge with its timestamp.
    #[inline(always)]
    pub fn edge(&mut self) -> (bool, u32) {
        let now_us = self.tim.read_count();
        gpio::clear_exti_interrupt(pinout::command::RC_IN.line());
        (self.pin.is_high(), now_us)
    }
}

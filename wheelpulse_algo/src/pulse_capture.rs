// Implements the RC command pulse capture, measuring the high time of the command
// signal from edge interrupts and handing it over to the control tick.

// Key Features:
// - Rising edge stores a microsecond timestamp, falling edge publishes the width
// - Width and "new sample" flag live in one cell guarded by a critical section
// - Reader takes the latest sample and clears the flag in the same critical section
// - Lost signal keeps the last width: no timeout, no error

// Detailed Operation:
// `on_edge()` runs in the edge interrupt. It may preempt the control tick at any
// point, so every access to the shared state goes through `critical_section::with`
// and copies the whole `CaptureState` in or out. The tick never observes a width
// from one pulse together with the flag of another.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::cell::Cell;

use critical_section::Mutex;

/// Count rate of the edge timestamps `on_edge()` expects.
pub const TIMESTAMP_HZ: u32 = 1_000_000;

/// Prescaler register value that divides `timer_clk_hz` down to `TIMESTAMP_HZ`.
///
/// The timer counts at `timer_clk_hz / (psc + 1)`. Clocks below 1 MHz give 0.
pub const fn timestamp_prescaler(timer_clk_hz: u32) -> u16 {
    let psc = (timer_clk_hz / TIMESTAMP_HZ).saturating_sub(1);
    if psc > u16::MAX as u32 {
        u16::MAX
    } else {
        psc as u16
    }
}

/// Latest captured command pulse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseSample {
    /// High time of the last complete pulse, microseconds.
    pub width_us: u32,
    /// Set when `width_us` was published after the previous `take()`.
    pub valid: bool,
}

#[derive(Clone, Copy)]
struct CaptureState {
    start_us: u32,    // Timestamp of the last rising edge
    armed: bool,      // A rising edge was seen and waits for its falling edge
    sample: PulseSample,
    captured: u32,    // Number of published samples, wraps
}

impl CaptureState {
    const fn new() -> Self {
        Self {
            start_us: 0,
            armed: false,
            sample: PulseSample {
                width_us: 0,
                valid: false,
            },
            captured: 0,
        }
    }
}

/// Interrupt-to-tick handoff of the command pulse width.
///
/// Built with `const fn new()` so it can live in a `static` shared between the
/// edge interrupt and the control task.
pub struct PulseCapture {
    state: Mutex<Cell<CaptureState>>,
}

impl PulseCapture {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(CaptureState::new())),
        }
    }

    /// Edge callback. `level_high` is the pin level after the edge, `now_us` a
    /// free-running microsecond counter (wrap-around is handled).
    pub fn on_edge(&self, level_high: bool, now_us: u32) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();

            if level_high {
                state.start_us = now_us;
                state.armed = true;
            } else if state.armed {
                state.sample = PulseSample {
                    width_us: now_us.wrapping_sub(state.start_us),
                    valid: true,
                };
                state.armed = false;
                state.captured = state.captured.wrapping_add(1);
            }
            // A falling edge without its rising edge carries no width

            cell.set(state);
        });
    }

    /// Returns the latest sample and clears its `valid` flag.
    ///
    /// Without new edges the previous width is returned again with `valid == false`.
    pub fn take(&self) -> PulseSample {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            let sample = state.sample;
            state.sample.valid = false;
            cell.set(state);
            sample
        })
    }

    /// Returns the latest sample without consuming it.
    pub fn peek(&self) -> PulseSample {
        critical_section::with(|cs| self.state.borrow(cs).get().sample)
    }

    /// Number of pulses published since start-up (wraps).
    pub fn captured(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow(cs).get().captured)
    }
}

impl Default for PulseCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(capture: &PulseCapture, start_us: u32, width_us: u32) {
        capture.on_edge(true, start_us);
        capture.on_edge(false, start_us.wrapping_add(width_us));
    }

    #[test]
    fn prescaler_gives_one_count_per_microsecond() {
        // STM32G431 APB1 timer clock at full speed
        let psc = timestamp_prescaler(170_000_000);
        assert_eq!(psc, 169);
        assert_eq!(170_000_000 / (psc as u32 + 1), TIMESTAMP_HZ);

        assert_eq!(timestamp_prescaler(16_000_000), 15);
        assert_eq!(timestamp_prescaler(1_000_000), 0);
        assert_eq!(timestamp_prescaler(500_000), 0);
    }

    #[test]
    fn falling_edge_publishes_width() {
        let capture = PulseCapture::new();
        pulse(&capture, 10_000, 1500);
        assert_eq!(
            capture.take(),
            PulseSample {
                width_us: 1500,
                valid: true
            }
        );
        assert_eq!(capture.captured(), 1);
    }

    #[test]
    fn take_clears_valid_and_keeps_width() {
        let capture = PulseCapture::new();
        pulse(&capture, 0, 1200);
        assert!(capture.take().valid);

        let stale = capture.take();
        assert!(!stale.valid);
        assert_eq!(stale.width_us, 1200);
    }

    #[test]
    fn only_rising_edges_keep_stale_width() {
        let capture = PulseCapture::new();
        pulse(&capture, 0, 1800);
        capture.take();

        capture.on_edge(true, 20_000);
        capture.on_edge(true, 40_000);
        let sample = capture.take();
        assert_eq!(sample.width_us, 1800);
        assert!(!sample.valid);
        assert_eq!(capture.captured(), 1);
    }

    #[test]
    fn falling_edge_before_any_rising_edge_is_ignored() {
        let capture = PulseCapture::new();
        capture.on_edge(false, 7_000);
        assert_eq!(capture.take(), PulseSample::default());
        assert_eq!(capture.captured(), 0);
    }

    #[test]
    fn width_survives_counter_wrap() {
        let capture = PulseCapture::new();
        pulse(&capture, u32::MAX - 499, 1500);
        assert_eq!(capture.take().width_us, 1500);
    }

    #[test]
    fn newest_pulse_wins_between_reads() {
        let capture = PulseCapture::new();
        pulse(&capture, 0, 1100);
        pulse(&capture, 20_000, 1900);
        assert_eq!(capture.peek().width_us, 1900);
        assert!(capture.peek().valid);
        assert_eq!(capture.take().width_us, 1900);
        assert_eq!(capture.captured(), 2);
    }

    #[test]
    fn interrupt_thread_handoff_is_never_torn() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        static CAPTURE: PulseCapture = PulseCapture::new();
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let done = done.clone();
            std::thread::spawn(move || {
                let mut now = 0u32;
                for i in 0..20_000u32 {
                    // Alternate between two widths, both edges recorded
                    let width = if i % 2 == 0 { 1000 } else { 2000 };
                    CAPTURE.on_edge(true, now);
                    now = now.wrapping_add(width);
                    CAPTURE.on_edge(false, now);
                    now = now.wrapping_add(20_000 - width);
                }
                done.store(true, Ordering::Release);
            })
        };

        while !done.load(Ordering::Acquire) {
            let width = CAPTURE.take().width_us;
            assert!(width == 0 || width == 1000 || width == 2000);
        }
        writer.join().unwrap();
        assert_eq!(CAPTURE.captured(), 20_000);
    }
}

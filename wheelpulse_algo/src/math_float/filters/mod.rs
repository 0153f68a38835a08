// Implements the command-signal filter pair applied to every captured pulse width.

// Key Features:
// - Low-pass stage smoothing the RC pulse width that becomes the setpoint
// - High-pass stage exposing fast pulse changes for diagnostics
// - One shared previous-input register updated after both stages ran

// Detailed Operation:
// Each tick the low-pass runs first on its old output, the high-pass runs second
// on its old output and the old previous input, and only then the previous input
// is replaced by the new raw sample. Changing that order changes the numbers.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

pub mod hpf;
pub mod lpf;

use hpf::FilterHPF;
use lpf::FilterLPF;

/// Copy of the filter registers, used for telemetry and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterState {
    pub low_pass: f32,
    pub high_pass: f32,
    pub previous_input: f32,
}

/// Low-pass and high-pass filters sharing a single raw-input history.
pub struct SignalFilters {
    lpf: FilterLPF,
    hpf: FilterHPF,
    previous_input: f32,
}

impl SignalFilters {
    /// Creates both filters with all registers at zero.
    pub fn new(lpf_alpha: f32, hpf_alpha: f32) -> Self {
        Self {
            lpf: FilterLPF::new(0.0, lpf_alpha),
            hpf: FilterHPF::new(hpf_alpha),
            previous_input: 0.0,
        }
    }

    /// Runs one filter step on `raw` and returns the new state.
    pub fn tick(&mut self, raw: f32) -> FilterState {
        self.lpf.tick(raw);
        self.hpf.tick(raw, self.previous_input);
        self.previous_input = raw;
        self.state()
    }

    /// Re-primes the filters so that a steady `seed` input produces no transient.
    pub fn reset(&mut self, seed: f32) {
        self.lpf.reset(seed);
        self.hpf.reset();
        self.previous_input = seed;
    }

    pub fn low_pass(&self) -> f32 {
        self.lpf.get_output()
    }

    pub fn high_pass(&self) -> f32 {
        self.hpf.get_output()
    }

    pub fn state(&self) -> FilterState {
        FilterState {
            low_pass: self.lpf.get_output(),
            high_pass: self.hpf.get_output(),
            previous_input: self.previous_input,
        }
    }
}

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Single-pole high-pass filter: `y = alpha * (y_prev + x - x_prev)`.
///
/// The previous raw input is not owned here: it is shared with the low-pass
/// stage and supplied by the caller, see `SignalFilters`.
pub struct FilterHPF {
    alpha: f32,
    output: f32,
}

impl FilterHPF {
    pub fn new(alpha: f32) -> FilterHPF {
        FilterHPF { alpha, output: 0.0 }
    }

    /// Advances the filter with the new input and the input of the previous tick.
    pub fn tick(&mut self, input: f32, prev_input: f32) -> f32 {
        self.output = self.alpha * (self.output + input - prev_input);
        self.output
    }

    pub fn get_output(&self) -> f32 {
        self.output
    }

    pub fn reset(&mut self) {
        self.output = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_input_decays_to_zero() {
        let mut hpf = FilterHPF::new(0.5);
        assert_eq!(hpf.tick(1500.0, 1400.0), 50.0);
        assert_eq!(hpf.tick(1500.0, 1500.0), 25.0);
        assert_eq!(hpf.tick(1500.0, 1500.0), 12.5);
    }
}

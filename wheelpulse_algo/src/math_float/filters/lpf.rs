// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Single-pole low-pass filter: `y = alpha * x + (1 - alpha) * y_prev`.
pub struct FilterLPF {
    alpha: f32,  // Smoothing factor (0.0..=1.0], 1.0 passes input through
    output: f32, // Filtered value, also the state for the next tick
}

impl FilterLPF {
    /// Constructor to initialize the filter with the default output and alpha
    pub fn new(output_default: f32, alpha: f32) -> FilterLPF {
        FilterLPF {
            alpha,
            output: output_default,
        }
    }

    /// Math call
    pub fn tick(&mut self, input: f32) -> f32 {
        // Uses the previous output before it is overwritten
        self.output = self.alpha * input + (1.0 - self.alpha) * self.output;
        self.output
    }

    /// Function to retrieve the output value
    pub fn get_output(&self) -> f32 {
        self.output
    }

    /// Overwrites the filter state
    pub fn reset(&mut self, output: f32) {
        self.output = output;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_one_passes_input_through() {
        let mut lpf = FilterLPF::new(0.0, 1.0);
        assert_eq!(lpf.tick(1234.0), 1234.0);
        assert_eq!(lpf.tick(-5.0), -5.0);
    }

    #[test]
    fn half_alpha_moves_halfway() {
        let mut lpf = FilterLPF::new(1000.0, 0.5);
        assert_eq!(lpf.tick(2000.0), 1500.0);
        assert_eq!(lpf.tick(2000.0), 1750.0);
        assert_eq!(lpf.get_output(), 1750.0);
    }
}

// Implements linear range mapping used to bring the command pulse width and the
// position sensor reading into one shared correction range.

// Key Features:
// - Plain linear interpolation between two bounded ranges
// - No clamping: out-of-range inputs extrapolate proportionally
// - Immutable `ControlRange` pairs fixed at configuration time

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Linearly maps `value` from `[from_min, from_max]` onto `[to_min, to_max]`.
///
/// Inputs outside the source range are not clamped, the result extrapolates
/// along the same line. `from_min == from_max` divides by zero, configuration
/// validation rejects such ranges before they reach the control loop.
#[inline(always)]
pub fn map(value: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    (value - from_min) * (to_max - to_min) / (from_max - from_min) + to_min
}

/// Closed numeric range with `min` and `max` bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlRange {
    pub min: f32,
    pub max: f32,
}

impl ControlRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Signed distance from `min` to `max`.
    #[inline(always)]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// True when the range can serve as a mapping source (non-zero, finite span).
    pub fn is_mappable(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.span() != 0.0
    }

    /// Checks whether `value` lies inside the range, bounds included.
    pub fn contains(&self, value: f32) -> bool {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        (lo..=hi).contains(&value)
    }

    /// Maps `value` from this range onto `target`.
    #[inline(always)]
    pub fn map_to(&self, value: f32, target: &ControlRange) -> f32 {
        map(value, self.min, self.max, target.min, target.max)
    }

    /// Clamps `value` into the range (bounds must be ordered).
    #[inline(always)]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, -200.0)]
    #[case(200.0, 0.0)]
    #[case(400.0, 200.0)]
    #[case(100.0, -100.0)]
    fn maps_sensor_span_onto_correction_span(#[case] input: f32, #[case] expected: f32) {
        assert_eq!(map(input, 0.0, 400.0, -200.0, 200.0), expected);
    }

    #[rstest]
    #[case(-100.0, -300.0)]
    #[case(500.0, 300.0)]
    fn extrapolates_outside_source_range(#[case] input: f32, #[case] expected: f32) {
        assert_eq!(map(input, 0.0, 400.0, -200.0, 200.0), expected);
    }

    #[test]
    fn command_pulse_maps_to_correction_range() {
        let command = ControlRange::new(1000.0, 2000.0);
        let control = ControlRange::new(-256.0, 256.0);
        assert_eq!(command.map_to(1000.0, &control), -256.0);
        assert_eq!(command.map_to(1500.0, &control), 0.0);
        assert_eq!(command.map_to(2000.0, &control), 256.0);
        // A glitchy 2500us pulse is passed through, not rejected
        assert_eq!(command.map_to(2500.0, &control), 512.0);
    }

    #[test]
    fn inverted_target_range_flips_direction() {
        let sensor = ControlRange::new(0.0, 400.0);
        let reversed = ControlRange::new(200.0, -200.0);
        assert_eq!(sensor.map_to(0.0, &reversed), 200.0);
        assert_eq!(sensor.map_to(400.0, &reversed), -200.0);
    }

    #[test]
    fn degenerate_range_is_not_mappable() {
        assert!(!ControlRange::new(5.0, 5.0).is_mappable());
        assert!(!ControlRange::new(0.0, f32::INFINITY).is_mappable());
        assert!(ControlRange::new(400.0, 0.0).is_mappable());
    }

    #[test]
    fn contains_accepts_either_bound_order() {
        let range = ControlRange::new(400.0, 0.0);
        assert!(range.contains(0.0));
        assert!(range.contains(400.0));
        assert!(!range.contains(400.5));
    }
}

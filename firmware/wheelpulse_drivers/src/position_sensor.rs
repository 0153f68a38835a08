// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    adc::{Adc, AdcDevice, InputType, SampleTime},
    clocks::Clocks,
    pac::ADC1,
};

use super::pinout;

/// ADC full scale (12 bit).
const ADC_FULL_SCALE: u32 = 4096;

/// Potentiometer on ADC1, reported at reduced resolution.
pub struct PositionSensor {
    adc: Adc<ADC1>,
    span: u16, // Reading at the top of the pot travel
}

impl PositionSensor {
    /// `span` sets the reduced resolution: readings are scaled to `0..=span`.
    pub fn new(adc1: ADC1, clock_cfg: &Clocks, span: u16) -> Self {
        pinout::sensor::POT.init();

        let mut adc = Adc::new_adc1(adc1, AdcDevice::One, Default::default(), clock_cfg.systick());
        adc.set_input_type(pinout::sensor::POT_CHANNEL, InputType::SingleEnded);
        adc.set_sample_time(pinout::sensor::POT_CHANNEL, SampleTime::T47);

        PositionSensor { adc, span }
    }

    /// Blocking single conversion, scaled to `0..=span`.
    pub fn read(&mut self) -> u16 {
        let raw = self.adc.read(pinout::sensor::POT_CHANNEL) as u32;
        (raw * self.span as u32 / (ADC_FULL_SCALE - 1)) as u16
    }
}

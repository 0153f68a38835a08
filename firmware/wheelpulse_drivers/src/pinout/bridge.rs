//! H-bridge pins: one enable line and one PWM input per half-bridge.
use super::PinDef;
use super::{PinMode, Port};

/// Enable pin for the H-bridge, held low until the controller is running
pub const ENABLE: PinDef = PinDef {
    port: Port::A,
    pin: 4,
    mode: PinMode::Output,
};

/// PWM input of the forward half-bridge (TIM3_CH1)
pub const PWM_FWD: PinDef = PinDef {
    port: Port::B,
    pin: 4,
    mode: PinMode::Alt(2),
};

/// PWM input of the reverse half-bridge (TIM3_CH2)
pub const PWM_REV: PinDef = PinDef {
    port: Port::B,
    pin: 5,
    mode: PinMode::Alt(2),
};

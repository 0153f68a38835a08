use super::PinDef;
use super::{PinMode, Port};

/// RC receiver channel carrying the position command pulses (EXTI line 10)
pub const RC_IN: PinDef = PinDef {
    port: Port::A,
    pin: 10,
    mode: PinMode::Input,
};

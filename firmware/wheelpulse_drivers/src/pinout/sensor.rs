use super::PinDef;
use super::{PinMode, Port};

/// Wiper of the position potentiometer (ADC1_IN3)
pub const POT: PinDef = PinDef {
    port: Port::A,
    pin: 2,
    mode: PinMode::Analog,
};

/// ADC1 channel sampled for the potentiometer
pub const POT_CHANNEL: u8 = 3;

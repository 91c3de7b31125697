//! Transceiver operating modes

use crate::InvalidMode;

/// Operating mode of the transceiver
///
/// Represents the state of the chip's mode sequencer, as encoded in
/// bits 4:2 of RegOpMode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Sleep: oscillator off, lowest current
    Sleep = 0x00,
    /// Standby: oscillator running, configuration allowed
    Standby = 0x04,
    /// Frequency synthesizer running
    Synthesizer = 0x08,
    /// Transmitting
    Transmit = 0x0C,
    /// Receiving
    Receive = 0x10,
}

impl Mode {
    /// Bit pattern of this mode within RegOpMode
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Mode {
    type Error = InvalidMode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Sleep),
            0x04 => Ok(Self::Standby),
            0x08 => Ok(Self::Synthesizer),
            0x0C => Ok(Self::Transmit),
            0x10 => Ok(Self::Receive),
            invalid => Err(InvalidMode(invalid)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_bits_round_trip() {
        for mode in [
            Mode::Sleep,
            Mode::Standby,
            Mode::Synthesizer,
            Mode::Transmit,
            Mode::Receive,
        ] {
            assert_eq!(Mode::try_from(mode.bits()), Ok(mode));
            assert_eq!(mode.bits() & !0x1C, 0);
        }
    }

    #[test]
    fn reserved_patterns_are_invalid() {
        assert_eq!(Mode::try_from(0x14), Err(InvalidMode(0x14)));
        assert_eq!(Mode::try_from(0x1C), Err(InvalidMode(0x1C)));
        assert_eq!(Mode::try_from(0x01), Err(InvalidMode(0x01)));
    }
}

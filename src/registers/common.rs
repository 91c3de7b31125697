//! Common configuration registers
//!
//! This module contains registers for the chip-wide configuration:
//! - Operating mode selection
//! - Carrier frequency
//! - Power amplifier level

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::{Band, InvalidMode, Mode};

/// Operating mode register (address: 0x01)
///
/// Bits 4:2 select the transceiver mode. Bit 7 disables the automatic
/// sequencer, bit 6 enables listen mode. The driver only ever touches the
/// mode field and preserves the rest.
#[register(0x01u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct OpMode {
    /// Raw register value
    pub value: u8,
}

impl OpMode {
    /// Mask of the mode field
    pub const MODE_MASK: u8 = 0x1C;

    /// Returns a copy with the mode field replaced by `mode`'s bit pattern.
    pub fn with_mode(self, mode: Mode) -> Self {
        Self {
            value: (self.value & !Self::MODE_MASK) | mode.bits(),
        }
    }

    /// Decodes the mode field.
    ///
    /// # Errors
    /// Returns `InvalidMode` for the reserved patterns.
    pub fn mode(self) -> Result<Mode, InvalidMode> {
        Mode::try_from(self.value & Self::MODE_MASK)
    }
}

/// Carrier frequency register (address: 0x07-0x09)
///
/// 24-bit value written MSB first across RegFrfMsb, RegFrfMid and RegFrfLsb.
/// Frf = Fcarrier / Fstep with Fstep = 32 MHz / 2^19 = 61.035 Hz.
///
/// # Note
/// The frequency change only takes effect once the LSB has been written,
/// so the three bytes are always written in one burst.
#[register(0x07u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Frf {
    /// 24-bit frequency word (upper byte ignored)
    pub value: u32,
}

impl From<Band> for Frf {
    fn from(band: Band) -> Self {
        let [msb, mid, lsb] = band.frf();
        Self {
            value: u32::from_be_bytes([0, msb, mid, lsb]),
        }
    }
}

/// Power amplifier level register (address: 0x11)
///
/// Bits 7:5 enable PA0/PA1/PA2, bits 4:0 set the output power level.
/// Pout = -18 dBm + OutputPower on PA0.
#[register(0x11u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct PaLevel {
    /// Raw register value
    pub value: u8,
}

impl PaLevel {
    /// Highest supported output power level
    pub const MAX_OUTPUT_POWER: u8 = 31;
    const OUTPUT_POWER_MASK: u8 = 0x1F;

    /// Returns a copy with the output power field replaced, keeping the PA selection bits.
    ///
    /// Levels above [`PaLevel::MAX_OUTPUT_POWER`] are clamped.
    pub fn with_output_power(self, level: u8) -> Self {
        let level = level.min(Self::MAX_OUTPUT_POWER);
        Self {
            value: (self.value & !Self::OUTPUT_POWER_MASK) | level,
        }
    }

    /// Output power field
    pub fn output_power(self) -> u8 {
        self.value & Self::OUTPUT_POWER_MASK
    }
}

impl FromByteArray for OpMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for OpMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for Frf {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            value: u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]),
        })
    }
}

impl ToByteArray for Frf {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [_, msb, mid, lsb] = self.value.to_be_bytes();
        Ok([msb, mid, lsb])
    }
}

impl FromByteArray for PaLevel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for PaLevel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opmode_preserves_sequencer_and_listen_bits() {
        let opmode = OpMode { value: 0xC0 | 0x10 };
        assert_eq!(opmode.with_mode(Mode::Standby).value, 0xC4);
        assert_eq!(opmode.mode(), Ok(Mode::Receive));
    }

    #[test]
    fn opmode_rejects_reserved_pattern() {
        assert_eq!(OpMode { value: 0x14 }.mode(), Err(InvalidMode(0x14)));
    }

    #[test]
    fn frf_splits_into_three_bytes() {
        let frf = Frf::from(Band::Mhz915);
        assert_eq!(frf.to_bytes(), Ok([0xE4, 0xC0, 0x00]));
    }

    #[test]
    fn pa_level_clamps_and_keeps_pa_bits() {
        let level = PaLevel { value: 0x9F }.with_output_power(200);
        assert_eq!(level.value, 0x9F);
        assert_eq!(level.output_power(), 31);

        let level = PaLevel { value: 0x9F }.with_output_power(5);
        assert_eq!(level.value, 0x85);
    }
}

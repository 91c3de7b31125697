//! Receiver signal strength registers
//!
//! This module contains registers related to RSSI measurement:
//! - Measurement trigger and completion flag
//! - Last measured value

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

bitflags! {
    /// RegRssiConfig bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RssiFlags: u8 {
        /// Set when the RSSI sampling has finished and the result is available
        const DONE = 0x02;
        /// Triggers an RSSI measurement when written 1
        const START = 0x01;
    }
}

/// RSSI configuration register (address: 0x23)
///
/// # Note
/// A manual trigger is only needed when the AGC is not already sampling
/// continuously in receive mode.
#[register(0x23u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct RssiConfig {
    /// Register flags
    pub flags: RssiFlags,
}

/// RSSI value register (address: 0x24)
///
/// Absolute value of the RSSI in dBm, 0.5 dB steps: RSSI = -value / 2.
#[register(0x24u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct RssiValue {
    /// Raw measurement
    pub value: u8,
}

impl RssiValue {
    /// Calibration offset added after halving
    pub const OFFSET: i16 = 20;

    /// Converts the raw sample into an approximate power level.
    ///
    /// The shift is arithmetic on the negated sample, so odd values round
    /// towards negative infinity: 40 gives 0, 41 gives -1.
    pub fn dbm(self) -> i16 {
        (-i16::from(self.value) >> 1) + Self::OFFSET
    }
}

impl FromByteArray for RssiConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: RssiFlags::from_bits_truncate(bytes[0]),
        })
    }
}

impl ToByteArray for RssiConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}

impl FromByteArray for RssiValue {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rssi_uses_arithmetic_shift() {
        assert_eq!(RssiValue { value: 40 }.dbm(), 0);
        assert_eq!(RssiValue { value: 41 }.dbm(), -1);
        assert_eq!(RssiValue { value: 0 }.dbm(), 20);
        assert_eq!(RssiValue { value: 255 }.dbm(), -108);
    }
}

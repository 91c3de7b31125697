//! Interrupt status registers
//!
//! RegIrqFlags1 and RegIrqFlags2 report the state of the mode sequencer and
//! the packet engine. The driver polls these instead of using the DIO pins.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister};

bitflags! {
    /// RegIrqFlags1 bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Irq1: u8 {
        /// Operating mode change has completed
        const MODE_READY = 0x80;
        const RX_READY = 0x40;
        const TX_READY = 0x20;
        const PLL_LOCK = 0x10;
        const RSSI = 0x08;
        const TIMEOUT = 0x04;
        const AUTO_MODE = 0x02;
        const SYNC_ADDRESS_MATCH = 0x01;
    }
}

bitflags! {
    /// RegIrqFlags2 bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Irq2: u8 {
        const FIFO_FULL = 0x80;
        const FIFO_NOT_EMPTY = 0x40;
        const FIFO_LEVEL = 0x20;
        const FIFO_OVERRUN = 0x10;
        /// Complete packet has been sent; cleared when leaving TX
        const PACKET_SENT = 0x08;
        /// Payload is ready in the FIFO; cleared once the FIFO is empty or RX restarts
        const PAYLOAD_READY = 0x04;
        const CRC_OK = 0x02;
    }
}

/// IRQ flags 1 register (address: 0x27)
#[register(0x27u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct IrqFlags1 {
    /// Current flags
    pub flags: Irq1,
}

/// IRQ flags 2 register (address: 0x28)
#[register(0x28u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct IrqFlags2 {
    /// Current flags
    pub flags: Irq2,
}

impl FromByteArray for IrqFlags1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: Irq1::from_bits_truncate(bytes[0]),
        })
    }
}

impl FromByteArray for IrqFlags2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: Irq2::from_bits_truncate(bytes[0]),
        })
    }
}

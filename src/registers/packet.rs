//! Packet engine registers
//!
//! This module contains registers used by the packet handler:
//! - Sync word bytes (bus handshake and network id)
//! - Node address
//! - Packet configuration 2 (RX restart, AES enable)
//! - AES key
//!
//! The FIFO itself is not a register type; it is accessed by burst at [`FIFO`].

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// FIFO read/write access (address: 0x00)
///
/// Reads pop and writes push; the address does not auto-increment.
pub const FIFO: u8 = 0x00;

/// First sync word byte (address: 0x2F)
///
/// Programmed to 0x2D during bootstrap. Before that it is used as a scratch
/// register for the bus sync handshake, since it reads back exactly what was written.
#[register(0x2Fu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct SyncValue1 {
    /// Sync word byte
    pub value: u8,
}

/// Second sync word byte (address: 0x30)
///
/// Holds the network id: radios only hear frames whose sync word matches theirs.
#[register(0x30u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct SyncValue2 {
    /// Network id
    pub network_id: u8,
}

/// Node address register (address: 0x39)
///
/// Used by the chip's own address filtering. The driver leaves hardware
/// filtering off and filters in software, but keeps this in sync.
#[register(0x39u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister, Default)]
pub struct NodeAddress {
    /// Node address
    pub address: u8,
}

bitflags! {
    /// RegPacketConfig2 bits
    ///
    /// Bits 7:4 hold the inter-packet RX delay and are carried through untouched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PacketConfig2Flags: u8 {
        /// Forces the receiver into WAIT mode, restarting reception. Reads back 0.
        const RX_RESTART = 0x04;
        /// Automatic RX restart after PayloadReady has been cleared
        const AUTO_RX_RESTART = 0x02;
        /// AES decryption/encryption enabled
        const AES_ON = 0x01;

        const _ = !0;
    }
}

/// Packet configuration 2 register (address: 0x3D)
#[register(0x3Du8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct PacketConfig2 {
    /// Register flags
    pub flags: PacketConfig2Flags,
}

/// AES key registers (address: 0x3E-0x4D)
///
/// Write only in practice. Must be written in Sleep or Standby mode.
/// The key survives a chip reset.
#[register(0x3Eu8)]
#[derive(Debug, Clone, Copy, WritableRegister)]
pub struct AesKey {
    /// 128-bit key, first byte at 0x3E
    pub key: [u8; 16],
}

impl FromByteArray for SyncValue1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for SyncValue1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for SyncValue2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            network_id: bytes[0],
        })
    }
}

impl ToByteArray for SyncValue2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.network_id])
    }
}

impl FromByteArray for NodeAddress {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { address: bytes[0] })
    }
}

impl ToByteArray for NodeAddress {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.address])
    }
}

impl FromByteArray for PacketConfig2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: PacketConfig2Flags::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for PacketConfig2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}

impl ToByteArray for AesKey {
    type Error = Infallible;
    type Array = [u8; 16];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.key)
    }
}

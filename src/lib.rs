#![no_std]
//! RFM69 Radio Driver
//!
//! This crate provides a driver for the HopeRF RFM69 family (Semtech SX1231
//! based) sub-GHz FSK packet radio transceivers, talking to the chip over SPI.
//!
//! # Features
//! - Carrier bands: 315, 433, 868 and 915 MHz
//! - Variable length packets with up to 61 bytes of payload
//! - Node addressing with a broadcast address (255)
//! - Hardware AES-128 encryption
//! - Output power control and RSSI sampling
//! - Blocking (embedded-hal) and async (embedded-hal-async) APIs
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Register access over SPI
//!   - Raw and typed single register reads and writes
//!   - Burst access to the FIFO and the AES key
//!
//! - [`registers`]: Register definitions for direct hardware access
//!   - [`registers::BOOTSTRAP`]: defaults applied at initialization
//!
//! - [`mode`]: The five operating modes of the transceiver
//!
//! - [`packet`]: Frame encoding and decoding with address filtering
//!
//! - [`radio`]: The [`Rfm69`] driver tying everything together
//!
//! # Usage
//! The main entry point is [`Rfm69`], which owns the SPI device and a delay
//! provider and tracks the chip's mode, node address and power level.
//!
//! Initialization follows a fixed sequence:
//!
//! 1. Bus sync handshake through RegSyncValue1
//! 2. Register defaults from [`registers::BOOTSTRAP`]
//! 3. Network id into the second sync word byte
//! 4. Carrier frequency for the selected [`Band`]
//! 5. Encryption disabled
//! 6. Standby
//!
//! # Important Notes
//! - The AES key can only be written in standby or sleep
//! - Leaving sleep waits for the oscillator (ModeReady)
//! - A received [`Packet`] with an empty payload means the receive timed out
//! - All waits are register polls bounded by [`Config`]
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, spi::SpiDevice};
//! use rfm69::{Band, Config, Error, Rfm69};
//!
//! fn configure_radio<SPI: SpiDevice, D: DelayNs>(
//!     spi: SPI,
//!     delay: D,
//! ) -> Result<Rfm69<SPI, D>, Error<SPI::Error>> {
//!     let mut radio = Rfm69::initialize(spi, delay, Band::try_from(868u16)?, 100, Config::default())?;
//!
//!     radio.set_address(1)?;
//!     radio.set_power(20)?;
//!
//!     Ok(radio)
//! }
//! ```

mod log;

pub mod config;
pub mod device;
pub mod error;
pub mod mode;
pub mod packet;
pub mod radio;
pub mod registers;

pub use config::{Band, Config};
pub use device::Device;
pub use error::{Error, InvalidFrequency, InvalidMode};
pub use mode::Mode;
pub use packet::{Packet, BROADCAST_ADDRESS, MAX_PAYLOAD_LEN};
pub use radio::Rfm69;

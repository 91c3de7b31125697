//! Register definitions for the RFM69 radio
//! Generated from the SX1231/RFM69HCW datasheets
//!
//! Only the registers the driver touches after bootstrap have typed
//! definitions. Everything else is programmed once from [`BOOTSTRAP`].

mod common;
mod packet;
mod rf;
mod status;

pub use common::*;
pub use packet::*;
pub use rf::*;
pub use status::*;

/// Register defaults applied in order during initialization, as `(address, value)`.
///
/// Packet mode FSK at 55.5 kbps with 50 kHz deviation, 2-byte sync word
/// starting with 0x2D, variable length frames with CRC and auto-clear.
pub const BOOTSTRAP: [(u8, u8); 16] = [
    // RegOpMode: sequencer on, listen off, standby
    (0x01, 0x04),
    // RegDataModul: packet mode, FSK, no shaping
    (0x02, 0x00),
    // RegBitrateMsb/Lsb: 55555 bps
    (0x03, 0x02),
    (0x04, 0x40),
    // RegFdevMsb/Lsb: 50 kHz
    (0x05, 0x03),
    (0x06, 0x33),
    // RegRxBw: DccFreq 010, RxBwMant 16, RxBwExp 2
    (0x19, 0x42),
    // RegRssiThresh: -110 dBm
    (0x29, 0xDC),
    // RegPreambleLsb: 3 bytes
    (0x2D, 0x03),
    // RegSyncConfig: sync on, fill on sync address, 2 bytes, no tolerance
    (0x2E, 0x88),
    // RegSyncValue1
    (0x2F, 0x2D),
    // RegPacketConfig1: variable length, DC-free off, CRC on, CRC auto-clear on, no address filtering
    (0x37, 0x90),
    // RegPayloadLength
    (0x38, 66),
    // RegFifoThresh: TX start on FIFO not empty, threshold 15
    (0x3C, 0x8F),
    // RegPacketConfig2: RX restart delay 2 bits, auto RX restart on, AES off
    (0x3D, 0x12),
    // RegTestDagc: improved margin for low-beta AFC offset
    (0x6F, 0x30),
];

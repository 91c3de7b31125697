//! Simulated RFM69 for driver tests.
//!
//! Models the register file with address auto-increment, the FIFO, and the
//! status flags the driver polls. Frames queued in `incoming` are loaded into
//! the FIFO each time the receiver is switched on; frames pushed into the FIFO
//! are "transmitted" into `sent` when the transmitter is switched on.

#![allow(dead_code)]

use std::cell::{RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::spi::{ErrorKind, ErrorType, Operation};

pub const REG_FIFO: u8 = 0x00;
pub const REG_OPMODE: u8 = 0x01;
pub const REG_FRF: u8 = 0x07;
pub const REG_PALEVEL: u8 = 0x11;
pub const REG_RSSICONFIG: u8 = 0x23;
pub const REG_RSSIVALUE: u8 = 0x24;
pub const REG_IRQFLAGS1: u8 = 0x27;
pub const REG_IRQFLAGS2: u8 = 0x28;
pub const REG_SYNCVALUE1: u8 = 0x2F;
pub const REG_SYNCVALUE2: u8 = 0x30;
pub const REG_NODEADRS: u8 = 0x39;
pub const REG_PACKETCONFIG2: u8 = 0x3D;
pub const REG_AESKEY1: u8 = 0x3E;

const MODE_MASK: u8 = 0x1C;
const MODE_STANDBY: u8 = 0x04;
const MODE_TX: u8 = 0x0C;
const MODE_RX: u8 = 0x10;

const MODE_READY: u8 = 0x80;
const PACKET_SENT: u8 = 0x08;
const PAYLOAD_READY: u8 = 0x04;
const RX_RESTART: u8 = 0x04;
const RSSI_START: u8 = 0x01;
const RSSI_DONE: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

impl embedded_hal::spi::Error for BusFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug)]
pub struct Chip {
    pub regs: [u8; 0x80],
    pub irq2: u8,
    pub rx_fifo: VecDeque<u8>,
    pub tx_fifo: Vec<u8>,
    pub incoming: VecDeque<Vec<u8>>,
    pub sent: Vec<Vec<u8>>,
    /// Every write transaction as (start address, data bytes)
    pub writes: Vec<(u8, Vec<u8>)>,
    /// Start address of every read transaction
    pub reads: Vec<u8>,
    /// Every read returns 0
    pub deaf: bool,
    /// ModeReady never raised
    pub mode_ready_stuck: bool,
    /// PacketSent never raised
    pub never_sends: bool,
    /// RssiDone never raised
    pub rssi_stuck: bool,
    /// Every transaction fails
    pub faulty: bool,
}

impl Default for Chip {
    fn default() -> Self {
        let mut regs = [0; 0x80];
        regs[REG_OPMODE as usize] = MODE_STANDBY;
        regs[REG_PALEVEL as usize] = 0x9F;
        regs[REG_PACKETCONFIG2 as usize] = 0x02;

        Self {
            regs,
            irq2: 0,
            rx_fifo: VecDeque::new(),
            tx_fifo: Vec::new(),
            incoming: VecDeque::new(),
            sent: Vec::new(),
            writes: Vec::new(),
            reads: Vec::new(),
            deaf: false,
            mode_ready_stuck: false,
            never_sends: false,
            rssi_stuck: false,
            faulty: false,
        }
    }
}

impl Chip {
    pub fn reg(&self, addr: u8) -> u8 {
        self.regs[addr as usize]
    }

    pub fn mode_bits(&self) -> u8 {
        self.reg(REG_OPMODE) & MODE_MASK
    }

    /// Data bytes of every write transaction starting at `addr`
    pub fn writes_to(&self, addr: u8) -> Vec<Vec<u8>> {
        self.writes
            .iter()
            .filter(|(start, _)| *start == addr)
            .map(|(_, data)| data.clone())
            .collect()
    }

    pub fn reads_of(&self, addr: u8) -> usize {
        self.reads.iter().filter(|start| **start == addr).count()
    }

    /// Leaves a frame in the FIFO as if an earlier one was never read out.
    pub fn leave_stale_payload(&mut self) {
        self.rx_fifo.extend([3, 0, 0, 0]);
        self.irq2 |= PAYLOAD_READY;
    }

    fn read_byte(&mut self, addr: u8) -> u8 {
        if self.deaf {
            return 0;
        }
        match addr {
            REG_FIFO => {
                let byte = self.rx_fifo.pop_front().unwrap_or(0);
                if self.rx_fifo.is_empty() {
                    self.irq2 &= !PAYLOAD_READY;
                }
                byte
            }
            REG_IRQFLAGS1 if self.mode_ready_stuck => 0,
            REG_IRQFLAGS1 => MODE_READY,
            REG_IRQFLAGS2 => self.irq2,
            _ => self.regs[addr as usize],
        }
    }

    fn write_byte(&mut self, addr: u8, value: u8) {
        match addr {
            REG_FIFO => self.tx_fifo.push(value),
            REG_OPMODE => {
                let leaving = self.mode_bits();
                self.regs[REG_OPMODE as usize] = value;
                self.enter(leaving, value & MODE_MASK);
            }
            REG_PACKETCONFIG2 => {
                if value & RX_RESTART != 0 {
                    self.rx_fifo.clear();
                    self.irq2 &= !PAYLOAD_READY;
                }
                self.regs[addr as usize] = value & !RX_RESTART;
            }
            REG_RSSICONFIG => {
                let done = value & RSSI_START != 0 && !self.rssi_stuck;
                self.regs[addr as usize] = if done { RSSI_DONE } else { 0 };
            }
            _ => self.regs[addr as usize] = value,
        }
    }

    fn enter(&mut self, leaving: u8, mode: u8) {
        if leaving == MODE_TX && mode != MODE_TX {
            self.irq2 &= !PACKET_SENT;
        }
        match mode {
            MODE_TX if !self.never_sends && !self.tx_fifo.is_empty() => {
                self.sent.push(std::mem::take(&mut self.tx_fifo));
                self.irq2 |= PACKET_SENT;
            }
            MODE_RX if self.rx_fifo.is_empty() => {
                if let Some(frame) = self.incoming.pop_front() {
                    self.rx_fifo.extend(frame);
                    self.irq2 |= PAYLOAD_READY;
                }
            }
            _ => {}
        }
    }

    fn run(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BusFault> {
        if self.faulty {
            return Err(BusFault);
        }

        let mut cursor = Cursor::default();
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        self.clock(&mut cursor, byte);
                    }
                }
                Operation::Read(buf) => {
                    for slot in buf.iter_mut() {
                        *slot = self.clock(&mut cursor, 0);
                    }
                }
                Operation::Transfer(read, write) => {
                    for i in 0..read.len().max(write.len()) {
                        let out = self.clock(&mut cursor, write.get(i).copied().unwrap_or(0));
                        if let Some(slot) = read.get_mut(i) {
                            *slot = out;
                        }
                    }
                }
                Operation::TransferInPlace(buf) => {
                    for slot in buf.iter_mut() {
                        *slot = self.clock(&mut cursor, *slot);
                    }
                }
                Operation::DelayNs(_) => {}
            }
        }

        if let Some(start) = cursor.start {
            if cursor.write {
                self.writes.push((start, cursor.data));
            } else {
                self.reads.push(start);
            }
        }
        Ok(())
    }

    fn clock(&mut self, cursor: &mut Cursor, byte: u8) -> u8 {
        let Some(_) = cursor.start else {
            cursor.start = Some(byte & 0x7F);
            cursor.addr = byte & 0x7F;
            cursor.write = byte & 0x80 != 0;
            return 0;
        };

        let addr = cursor.addr;
        if addr != REG_FIFO {
            cursor.addr = (addr + 1) & 0x7F;
        }

        if cursor.write {
            cursor.data.push(byte);
            self.write_byte(addr, byte);
            0
        } else {
            self.read_byte(addr)
        }
    }
}

#[derive(Default)]
struct Cursor {
    start: Option<u8>,
    addr: u8,
    write: bool,
    data: Vec<u8>,
}

/// SPI device handle onto a shared [`Chip`]
#[derive(Clone, Default)]
pub struct FakeSpi(Rc<RefCell<Chip>>);

impl FakeSpi {
    pub fn chip(&self) -> RefMut<'_, Chip> {
        self.0.borrow_mut()
    }
}

impl ErrorType for FakeSpi {
    type Error = BusFault;
}

impl embedded_hal::spi::SpiDevice for FakeSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        self.0.borrow_mut().run(operations)
    }
}

impl embedded_hal_async::spi::SpiDevice for FakeSpi {
    async fn transaction(
        &mut self,
        operations: &mut [Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        self.0.borrow_mut().run(operations)
    }
}

pub struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

impl embedded_hal_async::delay::DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

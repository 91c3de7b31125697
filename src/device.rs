//! RFM69 Register Access
//!
//! This module provides the low-level interface for talking to an RFM69 over SPI.
//! Every transaction starts with one address byte whose top bit selects the
//! direction (set = write, clear = read), followed by one or more data bytes.
//! Addresses other than the FIFO auto-increment, so multi-byte registers and
//! bursts are a single transaction with chip select held throughout.
//!
//! The interface is built around the `Device<SPI, D>` struct which wraps an SPI
//! device and a delay provider and provides methods for:
//! - Reading and writing raw registers by address
//! - Reading and writing typed registers defined in [`crate::registers`]
//! - Burst access for the FIFO and the AES key
//!
//! Each transaction is followed by a short settle delay.
//!
//! # Example
//! ```no_run
//! use rfm69::{Device, registers::OpMode};
//!
//! # fn demo<SPI, D>(spi: SPI, delay: D) -> Result<(), rfm69::Error<SPI::Error>>
//! # where SPI: embedded_hal::spi::SpiDevice, D: embedded_hal::delay::DelayNs {
//! let mut device = Device::new(spi, delay);
//!
//! let version = device.read_raw(0x10)?;
//! let opmode: OpMode = device.read_register()?;
//! # Ok(()) }
//! ```

use core::convert::Infallible;

use regiface::{ByteArray, ReadableRegister, WritableRegister};

use crate::Error;

/// Direction bit set in the address byte of write transactions
pub const WRITE_FLAG: u8 = 0x80;

/// Time the chip is given after each transaction, in microseconds
pub const SETTLE_DELAY_US: u32 = 5;

/// Register access interface for the RFM69.
///
/// Wraps an SPI device and a delay provider. Blocking operations are available
/// through the embedded-hal traits and asynchronous operations through
/// embedded-hal-async.
pub struct Device<SPI, D> {
    spi: SPI,
    delay: D,
}

impl<SPI, D> Device<SPI, D> {
    /// Creates a new Device instance wrapping the provided SPI device and delay.
    pub fn new(spi: SPI, delay: D) -> Self {
        Self { spi, delay }
    }

    /// Releases the underlying SPI device and delay provider.
    pub fn release(self) -> (SPI, D) {
        (self.spi, self.delay)
    }
}

impl<SPI, D> Device<SPI, D>
where
    SPI: embedded_hal::spi::SpiDevice,
    D: embedded_hal::delay::DelayNs,
{
    /// Reads a single register by address.
    ///
    /// Performs one two-byte exchange with the direction bit clear and returns
    /// the byte clocked out during the second position.
    ///
    /// # Errors
    /// * `Error::Transport` - SPI communication failed
    pub fn read_raw(&mut self, addr: u8) -> Result<u8, Error<SPI::Error>> {
        let mut buf = [addr & !WRITE_FLAG, 0x00];
        self.exchange(&mut buf)?;
        Ok(buf[1])
    }

    /// Writes a single register by address.
    ///
    /// Performs one two-byte exchange with the direction bit set.
    ///
    /// # Errors
    /// * `Error::Transport` - SPI communication failed
    pub fn write_raw(&mut self, addr: u8, value: u8) -> Result<(), Error<SPI::Error>> {
        let mut buf = [addr | WRITE_FLAG, value];
        self.exchange(&mut buf)
    }

    /// Exchanges `buf` with the chip in place and waits for the settle delay.
    ///
    /// The first byte must be an address byte; the rest are replaced with
    /// whatever the chip clocks out.
    pub fn exchange(&mut self, buf: &mut [u8]) -> Result<(), Error<SPI::Error>> {
        self.spi
            .transaction(&mut [embedded_hal::spi::Operation::TransferInPlace(buf)])
            .map_err(Error::Transport)?;
        self.delay.delay_us(SETTLE_DELAY_US);
        Ok(())
    }

    /// Reads a typed register value from the device.
    ///
    /// # Type Parameters
    /// * `R` - Register type implementing ReadableRegister with u8 ID
    ///
    /// # Errors
    /// * `Error::Transport` - SPI communication failed
    /// * `Error::Decode` - Failed to parse register value
    pub fn read_register<R>(&mut self) -> Result<R, Error<SPI::Error>>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();
        self.read_burst(R::id(), raw_value.as_mut())?;
        R::from_bytes(raw_value).map_err(|_| Error::Decode)
    }

    /// Writes a typed register value to the device.
    ///
    /// Registers wider than one byte are written in a single burst starting at
    /// the register's address.
    ///
    /// # Errors
    /// * `Error::Transport` - SPI communication failed
    pub fn write_register<R>(&mut self, register: R) -> Result<(), Error<SPI::Error>>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = match register.to_bytes() {
            Ok(raw) => raw,
            Err(never) => match never {},
        };
        self.write_burst(R::id(), raw_value.as_ref())
    }

    /// Writes `bytes` starting at `addr` in one transaction.
    ///
    /// For the FIFO address every byte is queued; for other addresses the chip
    /// auto-increments the target register.
    ///
    /// # Errors
    /// * `Error::Transport` - SPI communication failed
    pub fn write_burst(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Error<SPI::Error>> {
        let header = [addr | WRITE_FLAG];

        self.spi
            .transaction(&mut [
                embedded_hal::spi::Operation::Write(header.as_slice()),
                embedded_hal::spi::Operation::Write(bytes),
            ])
            .map_err(Error::Transport)?;
        self.delay.delay_us(SETTLE_DELAY_US);
        Ok(())
    }

    /// Reads `bytes.len()` bytes starting at `addr` in one transaction.
    ///
    /// # Errors
    /// * `Error::Transport` - SPI communication failed
    pub fn read_burst(&mut self, addr: u8, bytes: &mut [u8]) -> Result<(), Error<SPI::Error>> {
        let header = [addr & !WRITE_FLAG];

        self.spi
            .transaction(&mut [
                embedded_hal::spi::Operation::Write(header.as_slice()),
                embedded_hal::spi::Operation::Read(bytes),
            ])
            .map_err(Error::Transport)?;
        self.delay.delay_us(SETTLE_DELAY_US);
        Ok(())
    }
}

impl<SPI, D> Device<SPI, D>
where
    SPI: embedded_hal_async::spi::SpiDevice,
    D: embedded_hal_async::delay::DelayNs,
{
    /// Asynchronously reads a single register by address.
    ///
    /// This is the async version of [`read_raw`](Device::read_raw).
    pub async fn read_raw_async(&mut self, addr: u8) -> Result<u8, Error<SPI::Error>> {
        let mut buf = [addr & !WRITE_FLAG, 0x00];
        self.exchange_async(&mut buf).await?;
        Ok(buf[1])
    }

    /// Asynchronously writes a single register by address.
    ///
    /// This is the async version of [`write_raw`](Device::write_raw).
    pub async fn write_raw_async(&mut self, addr: u8, value: u8) -> Result<(), Error<SPI::Error>> {
        let mut buf = [addr | WRITE_FLAG, value];
        self.exchange_async(&mut buf).await
    }

    /// Asynchronously exchanges `buf` with the chip in place.
    ///
    /// This is the async version of [`exchange`](Device::exchange).
    pub async fn exchange_async(&mut self, buf: &mut [u8]) -> Result<(), Error<SPI::Error>> {
        self.spi
            .transaction(&mut [embedded_hal_async::spi::Operation::TransferInPlace(buf)])
            .await
            .map_err(Error::Transport)?;
        self.delay.delay_us(SETTLE_DELAY_US).await;
        Ok(())
    }

    /// Asynchronously reads a typed register value from the device.
    ///
    /// This is the async version of [`read_register`](Device::read_register).
    pub async fn read_register_async<R>(&mut self) -> Result<R, Error<SPI::Error>>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();
        self.read_burst_async(R::id(), raw_value.as_mut()).await?;
        R::from_bytes(raw_value).map_err(|_| Error::Decode)
    }

    /// Asynchronously writes a typed register value to the device.
    ///
    /// This is the async version of [`write_register`](Device::write_register).
    pub async fn write_register_async<R>(&mut self, register: R) -> Result<(), Error<SPI::Error>>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = match register.to_bytes() {
            Ok(raw) => raw,
            Err(never) => match never {},
        };
        self.write_burst_async(R::id(), raw_value.as_ref()).await
    }

    /// Asynchronously writes `bytes` starting at `addr` in one transaction.
    ///
    /// This is the async version of [`write_burst`](Device::write_burst).
    pub async fn write_burst_async(
        &mut self,
        addr: u8,
        bytes: &[u8],
    ) -> Result<(), Error<SPI::Error>> {
        let header = [addr | WRITE_FLAG];

        self.spi
            .transaction(&mut [
                embedded_hal_async::spi::Operation::Write(header.as_slice()),
                embedded_hal_async::spi::Operation::Write(bytes),
            ])
            .await
            .map_err(Error::Transport)?;
        self.delay.delay_us(SETTLE_DELAY_US).await;
        Ok(())
    }

    /// Asynchronously reads `bytes.len()` bytes starting at `addr`.
    ///
    /// This is the async version of [`read_burst`](Device::read_burst).
    pub async fn read_burst_async(
        &mut self,
        addr: u8,
        bytes: &mut [u8],
    ) -> Result<(), Error<SPI::Error>> {
        let header = [addr & !WRITE_FLAG];

        self.spi
            .transaction(&mut [
                embedded_hal_async::spi::Operation::Write(header.as_slice()),
                embedded_hal_async::spi::Operation::Read(bytes),
            ])
            .await
            .map_err(Error::Transport)?;
        self.delay.delay_us(SETTLE_DELAY_US).await;
        Ok(())
    }
}

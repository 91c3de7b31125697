//! RFM69 driver
//!
//! [`Rfm69`] owns the register interface together with the state the chip
//! cannot report cheaply: the last committed operating mode, the node address
//! and the transmit power level. Every operation takes `&mut self`, so one
//! driver instance talks to one chip and concurrent use needs an external lock
//! around the whole driver.
//!
//! All waits on the chip are busy-polls of its status registers, bounded by
//! the limits in [`Config`]. The one exception is [`Rfm69::receive`], whose
//! bound is passed per call and whose expiry is a normal outcome.
//!
//! # Example
//! ```no_run
//! use rfm69::{Band, Config, Rfm69};
//!
//! # fn demo<SPI, D>(spi: SPI, delay: D) -> Result<(), rfm69::Error<SPI::Error>>
//! # where SPI: embedded_hal::spi::SpiDevice, D: embedded_hal::delay::DelayNs {
//! let mut radio = Rfm69::initialize(spi, delay, Band::Mhz915, 100, Config::default())?;
//! radio.set_encryption_key(Some(b"ABCDEFGHIJKLMNOP"))?;
//! radio.set_power(31)?;
//! radio.set_address(1)?;
//!
//! loop {
//!     let packet = radio.receive(10_000)?;
//!     if !packet.is_empty() {
//!         let rssi = radio.read_rssi(false)?;
//!         radio.send(packet.sender, b"pong", false)?;
//!     }
//! }
//! # }
//! ```

use crate::config::PollBudget;
use crate::log::{debug, info, trace, warn};
use crate::packet::{Frame, FrameHeader, Packet, MAX_FRAME_LEN};
use crate::registers::{
    AesKey, Frf, Irq1, Irq2, IrqFlags1, IrqFlags2, NodeAddress, OpMode, PaLevel, PacketConfig2,
    PacketConfig2Flags, RssiConfig, RssiFlags, RssiValue, SyncValue1, SyncValue2, BOOTSTRAP,
    FIFO,
};
use crate::{Band, Config, Device, Error, Mode};

/// Values the chip must echo back from RegSyncValue1 before it is configured
const SYNC_SENTINELS: [u8; 2] = [0xAA, 0x55];

/// Status flags the driver waits on
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum WaitFor {
    ModeReady,
    PacketSent,
    RssiDone,
}

impl WaitFor {
    fn limit(self, config: &Config) -> Option<u32> {
        match self {
            Self::ModeReady => config.mode_ready_polls,
            Self::PacketSent => config.packet_sent_polls,
            Self::RssiDone => config.rssi_polls,
        }
    }

    fn timeout<E>(self) -> Error<E> {
        match self {
            Self::ModeReady => Error::ModeReadyTimeout,
            Self::PacketSent => Error::SendTimeout,
            Self::RssiDone => Error::RssiTimeout,
        }
    }
}

/// Driver for one RFM69 transceiver.
pub struct Rfm69<SPI, D> {
    device: Device<SPI, D>,
    config: Config,
    mode: Option<Mode>,
    address: Option<u8>,
    power: Option<u8>,
}

impl<SPI, D> Rfm69<SPI, D> {
    /// Wraps the bus without talking to the chip.
    ///
    /// Call [`init`](Rfm69::init) (or [`init_async`](Rfm69::init_async))
    /// before any other operation.
    pub fn new(spi: SPI, delay: D, config: Config) -> Self {
        Self {
            device: Device::new(spi, delay),
            config,
            mode: None,
            address: None,
            power: None,
        }
    }

    /// Last mode committed to the chip, `None` before the first transition.
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Node address set with [`set_address`](Rfm69::set_address)
    pub fn address(&self) -> Option<u8> {
        self.address
    }

    /// Output power level set with [`set_power`](Rfm69::set_power), always <= 31
    pub fn power(&self) -> Option<u8> {
        self.power
    }

    /// Poll limits in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Direct register access.
    ///
    /// Writing RegOpMode through this bypasses the driver's mode tracking.
    pub fn device(&mut self) -> &mut Device<SPI, D> {
        &mut self.device
    }

    /// Sender byte for outgoing frames; 0 until an address is set.
    fn own_address(&self) -> u8 {
        self.address.unwrap_or(0)
    }
}

impl<SPI, D> Rfm69<SPI, D>
where
    SPI: embedded_hal::spi::SpiDevice,
    D: embedded_hal::delay::DelayNs,
{
    /// Creates a driver and runs [`init`](Rfm69::init).
    pub fn initialize(
        spi: SPI,
        delay: D,
        band: Band,
        network_id: u8,
        config: Config,
    ) -> Result<Self, Error<SPI::Error>> {
        let mut radio = Self::new(spi, delay, config);
        radio.init(band, network_id)?;
        Ok(radio)
    }

    /// Brings the chip into a known configuration.
    ///
    /// Runs the bus sync handshake, applies [`BOOTSTRAP`], programs the network
    /// id and carrier frequency, disables encryption and leaves the chip in
    /// standby.
    ///
    /// # Errors
    /// * `Error::SyncTimeout` - the chip never echoed the handshake sentinels
    /// * `Error::ModeReadyTimeout` - standby was not reached
    /// * `Error::Transport` - SPI communication failed
    pub fn init(&mut self, band: Band, network_id: u8) -> Result<(), Error<SPI::Error>> {
        for sentinel in SYNC_SENTINELS {
            self.sync(sentinel)?;
        }
        debug!("bus sync complete");

        // the bootstrap table rewrites RegOpMode behind the state machine's back
        self.mode = None;
        for (addr, value) in BOOTSTRAP {
            self.device.write_raw(addr, value)?;
        }

        self.device.write_register(SyncValue2 { network_id })?;
        self.device.write_register(Frf::from(band))?;

        // the key survives a chip reset
        self.set_encryption_key(None)?;

        self.set_mode(Mode::Standby)?;
        self.wait_for(WaitFor::ModeReady)?;

        info!("RFM69 ready on {} MHz, network {}", band.mhz(), network_id);
        Ok(())
    }

    fn sync(&mut self, sentinel: u8) -> Result<(), Error<SPI::Error>> {
        let mut budget = PollBudget::new(self.config.sync_attempts);
        while budget.tick() {
            self.device.write_register(SyncValue1 { value: sentinel })?;
            let echo: SyncValue1 = self.device.read_register()?;
            if echo.value == sentinel {
                return Ok(());
            }
        }
        warn!("no echo of sync sentinel {=u8:#x}", sentinel);
        Err(Error::SyncTimeout)
    }

    /// Switches the chip to `mode`.
    ///
    /// Does nothing if `mode` is already the committed mode. Leaving sleep
    /// additionally waits for ModeReady while the oscillator starts up.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<SPI::Error>> {
        if self.mode == Some(mode) {
            return Ok(());
        }

        let opmode: OpMode = self.device.read_register()?;
        self.device.write_register(opmode.with_mode(mode))?;

        let previous = self.mode.replace(mode);
        debug!("mode {} -> {}", previous, mode);

        if previous == Some(Mode::Sleep) {
            self.wait_for(WaitFor::ModeReady)?;
        }
        Ok(())
    }

    /// Reads RegOpMode and decodes the mode the chip reports.
    ///
    /// # Errors
    /// * `Error::InvalidMode` - the mode field holds a reserved pattern
    pub fn read_mode(&mut self) -> Result<Mode, Error<SPI::Error>> {
        let opmode: OpMode = self.device.read_register()?;
        Ok(opmode.mode()?)
    }

    /// Puts the chip to sleep.
    pub fn sleep(&mut self) -> Result<(), Error<SPI::Error>> {
        self.set_mode(Mode::Sleep)
    }

    /// Sleeps the chip and hands back the bus.
    pub fn power_down(mut self) -> Result<(SPI, D), Error<SPI::Error>> {
        self.sleep()?;
        Ok(self.device.release())
    }

    /// Programs or clears the AES key.
    ///
    /// Switches to standby first, since the key may only be written outside
    /// TX and RX. Clearing only drops the AES enable bit; the old key stays in
    /// the chip but is unused.
    pub fn set_encryption_key(&mut self, key: Option<&[u8; 16]>) -> Result<(), Error<SPI::Error>> {
        self.set_mode(Mode::Standby)?;

        if let Some(key) = key {
            self.device.write_register(AesKey { key: *key })?;
        }

        let mut config: PacketConfig2 = self.device.read_register()?;
        config.flags.set(PacketConfig2Flags::AES_ON, key.is_some());
        self.device.write_register(config)
    }

    /// Sets the node address used as sender and for receive filtering.
    pub fn set_address(&mut self, address: u8) -> Result<(), Error<SPI::Error>> {
        self.device.write_register(NodeAddress { address })?;
        self.address = Some(address);
        Ok(())
    }

    /// Sets the output power level, clamped to 0..=31.
    pub fn set_power(&mut self, level: u8) -> Result<(), Error<SPI::Error>> {
        let pa: PaLevel = self.device.read_register()?;
        let pa = pa.with_output_power(level);
        self.device.write_register(pa)?;
        self.power = Some(pa.output_power());
        Ok(())
    }

    /// Reads the RSSI in dBm.
    ///
    /// With `force_trigger` a new measurement is started and awaited first;
    /// otherwise the value from the continuously running AGC is returned.
    pub fn read_rssi(&mut self, force_trigger: bool) -> Result<i16, Error<SPI::Error>> {
        if force_trigger {
            self.device.write_register(RssiConfig {
                flags: RssiFlags::START,
            })?;
            self.wait_for(WaitFor::RssiDone)?;
        }

        let rssi: RssiValue = self.device.read_register()?;
        Ok(rssi.dbm())
    }

    /// Sends `payload` to `to`.
    ///
    /// Payloads longer than [`MAX_PAYLOAD_LEN`](crate::packet::MAX_PAYLOAD_LEN)
    /// are truncated. Returns to standby once the chip reports the packet sent.
    ///
    /// # Errors
    /// * `Error::SendTimeout` - PacketSent was not raised; the chip is put back in standby
    pub fn send(
        &mut self,
        to: u8,
        payload: &[u8],
        request_ack: bool,
    ) -> Result<(), Error<SPI::Error>> {
        // a payload left unread from an earlier receive would block the receiver
        self.restart_rx()?;

        self.set_mode(Mode::Standby)?;
        self.wait_for(WaitFor::ModeReady)?;

        let frame = Frame::new(to, self.own_address(), request_ack, payload);
        self.device.write_burst(FIFO, frame.as_bytes())?;

        self.set_mode(Mode::Transmit)?;
        let sent = self.wait_for(WaitFor::PacketSent);
        self.set_mode(Mode::Standby)?;
        sent
    }

    /// Waits for a packet addressed to this node or broadcast.
    ///
    /// Polls PayloadReady at most `timeout_ticks` times in total, across any
    /// frames dropped for being addressed elsewhere. On expiry the chip is put
    /// back in standby and an empty packet is returned.
    pub fn receive(&mut self, timeout_ticks: u32) -> Result<Packet, Error<SPI::Error>> {
        let mut budget = PollBudget::new(Some(timeout_ticks));

        loop {
            if self.payload_ready()? {
                self.restart_rx()?;
            }

            self.set_mode(Mode::Receive)?;

            loop {
                if !budget.tick() {
                    self.set_mode(Mode::Standby)?;
                    return Ok(Packet::empty());
                }
                if self.payload_ready()? {
                    break;
                }
            }

            self.set_mode(Mode::Standby)?;

            let mut raw = [0; 2];
            self.device.read_burst(FIFO, &mut raw)?;
            let header = FrameHeader::parse(raw);

            if !header.is_for(self.address) {
                trace!("dropping frame for {=u8}", header.target);
                continue;
            }
            if !header.is_well_formed() {
                warn!("dropping frame with length {=u8}", header.length);
                continue;
            }

            let mut body = [0; MAX_FRAME_LEN];
            let body = &mut body[..header.body_len()];
            self.device.read_burst(FIFO, body)?;

            return Ok(Packet::decode(header, body));
        }
    }

    fn restart_rx(&mut self) -> Result<(), Error<SPI::Error>> {
        let mut config: PacketConfig2 = self.device.read_register()?;
        config.flags.insert(PacketConfig2Flags::RX_RESTART);
        self.device.write_register(config)
    }

    fn payload_ready(&mut self) -> Result<bool, Error<SPI::Error>> {
        let irq: IrqFlags2 = self.device.read_register()?;
        Ok(irq.flags.contains(Irq2::PAYLOAD_READY))
    }

    fn is_set(&mut self, flag: WaitFor) -> Result<bool, Error<SPI::Error>> {
        Ok(match flag {
            WaitFor::ModeReady => {
                let irq: IrqFlags1 = self.device.read_register()?;
                irq.flags.contains(Irq1::MODE_READY)
            }
            WaitFor::PacketSent => {
                let irq: IrqFlags2 = self.device.read_register()?;
                irq.flags.contains(Irq2::PACKET_SENT)
            }
            WaitFor::RssiDone => {
                let rssi: RssiConfig = self.device.read_register()?;
                rssi.flags.contains(RssiFlags::DONE)
            }
        })
    }

    fn wait_for(&mut self, flag: WaitFor) -> Result<(), Error<SPI::Error>> {
        let mut budget = PollBudget::new(flag.limit(&self.config));
        while !self.is_set(flag)? {
            if !budget.tick() {
                warn!("timed out waiting for {}", flag);
                return Err(flag.timeout());
            }
        }
        Ok(())
    }
}

impl<SPI, D> Rfm69<SPI, D>
where
    SPI: embedded_hal_async::spi::SpiDevice,
    D: embedded_hal_async::delay::DelayNs,
{
    /// Asynchronously creates a driver and runs [`init_async`](Rfm69::init_async).
    pub async fn initialize_async(
        spi: SPI,
        delay: D,
        band: Band,
        network_id: u8,
        config: Config,
    ) -> Result<Self, Error<SPI::Error>> {
        let mut radio = Self::new(spi, delay, config);
        radio.init_async(band, network_id).await?;
        Ok(radio)
    }

    /// This is the async version of [`init`](Rfm69::init).
    pub async fn init_async(&mut self, band: Band, network_id: u8) -> Result<(), Error<SPI::Error>> {
        for sentinel in SYNC_SENTINELS {
            self.sync_async(sentinel).await?;
        }
        debug!("bus sync complete");

        self.mode = None;
        for (addr, value) in BOOTSTRAP {
            self.device.write_raw_async(addr, value).await?;
        }

        self.device
            .write_register_async(SyncValue2 { network_id })
            .await?;
        self.device.write_register_async(Frf::from(band)).await?;

        self.set_encryption_key_async(None).await?;

        self.set_mode_async(Mode::Standby).await?;
        self.wait_for_async(WaitFor::ModeReady).await?;

        info!("RFM69 ready on {} MHz, network {}", band.mhz(), network_id);
        Ok(())
    }

    async fn sync_async(&mut self, sentinel: u8) -> Result<(), Error<SPI::Error>> {
        let mut budget = PollBudget::new(self.config.sync_attempts);
        while budget.tick() {
            self.device
                .write_register_async(SyncValue1 { value: sentinel })
                .await?;
            let echo: SyncValue1 = self.device.read_register_async().await?;
            if echo.value == sentinel {
                return Ok(());
            }
        }
        warn!("no echo of sync sentinel {=u8:#x}", sentinel);
        Err(Error::SyncTimeout)
    }

    /// This is the async version of [`set_mode`](Rfm69::set_mode).
    pub async fn set_mode_async(&mut self, mode: Mode) -> Result<(), Error<SPI::Error>> {
        if self.mode == Some(mode) {
            return Ok(());
        }

        let opmode: OpMode = self.device.read_register_async().await?;
        self.device
            .write_register_async(opmode.with_mode(mode))
            .await?;

        let previous = self.mode.replace(mode);
        debug!("mode {} -> {}", previous, mode);

        if previous == Some(Mode::Sleep) {
            self.wait_for_async(WaitFor::ModeReady).await?;
        }
        Ok(())
    }

    /// This is the async version of [`read_mode`](Rfm69::read_mode).
    pub async fn read_mode_async(&mut self) -> Result<Mode, Error<SPI::Error>> {
        let opmode: OpMode = self.device.read_register_async().await?;
        Ok(opmode.mode()?)
    }

    /// This is the async version of [`sleep`](Rfm69::sleep).
    pub async fn sleep_async(&mut self) -> Result<(), Error<SPI::Error>> {
        self.set_mode_async(Mode::Sleep).await
    }

    /// This is the async version of [`power_down`](Rfm69::power_down).
    pub async fn power_down_async(mut self) -> Result<(SPI, D), Error<SPI::Error>> {
        self.sleep_async().await?;
        Ok(self.device.release())
    }

    /// This is the async version of [`set_encryption_key`](Rfm69::set_encryption_key).
    pub async fn set_encryption_key_async(
        &mut self,
        key: Option<&[u8; 16]>,
    ) -> Result<(), Error<SPI::Error>> {
        self.set_mode_async(Mode::Standby).await?;

        if let Some(key) = key {
            self.device.write_register_async(AesKey { key: *key }).await?;
        }

        let mut config: PacketConfig2 = self.device.read_register_async().await?;
        config.flags.set(PacketConfig2Flags::AES_ON, key.is_some());
        self.device.write_register_async(config).await
    }

    /// This is the async version of [`set_address`](Rfm69::set_address).
    pub async fn set_address_async(&mut self, address: u8) -> Result<(), Error<SPI::Error>> {
        self.device
            .write_register_async(NodeAddress { address })
            .await?;
        self.address = Some(address);
        Ok(())
    }

    /// This is the async version of [`set_power`](Rfm69::set_power).
    pub async fn set_power_async(&mut self, level: u8) -> Result<(), Error<SPI::Error>> {
        let pa: PaLevel = self.device.read_register_async().await?;
        let pa = pa.with_output_power(level);
        self.device.write_register_async(pa).await?;
        self.power = Some(pa.output_power());
        Ok(())
    }

    /// This is the async version of [`read_rssi`](Rfm69::read_rssi).
    pub async fn read_rssi_async(&mut self, force_trigger: bool) -> Result<i16, Error<SPI::Error>> {
        if force_trigger {
            self.device
                .write_register_async(RssiConfig {
                    flags: RssiFlags::START,
                })
                .await?;
            self.wait_for_async(WaitFor::RssiDone).await?;
        }

        let rssi: RssiValue = self.device.read_register_async().await?;
        Ok(rssi.dbm())
    }

    /// This is the async version of [`send`](Rfm69::send).
    pub async fn send_async(
        &mut self,
        to: u8,
        payload: &[u8],
        request_ack: bool,
    ) -> Result<(), Error<SPI::Error>> {
        self.restart_rx_async().await?;

        self.set_mode_async(Mode::Standby).await?;
        self.wait_for_async(WaitFor::ModeReady).await?;

        let frame = Frame::new(to, self.own_address(), request_ack, payload);
        self.device.write_burst_async(FIFO, frame.as_bytes()).await?;

        self.set_mode_async(Mode::Transmit).await?;
        let sent = self.wait_for_async(WaitFor::PacketSent).await;
        self.set_mode_async(Mode::Standby).await?;
        sent
    }

    /// This is the async version of [`receive`](Rfm69::receive).
    pub async fn receive_async(&mut self, timeout_ticks: u32) -> Result<Packet, Error<SPI::Error>> {
        let mut budget = PollBudget::new(Some(timeout_ticks));

        loop {
            if self.payload_ready_async().await? {
                self.restart_rx_async().await?;
            }

            self.set_mode_async(Mode::Receive).await?;

            loop {
                if !budget.tick() {
                    self.set_mode_async(Mode::Standby).await?;
                    return Ok(Packet::empty());
                }
                if self.payload_ready_async().await? {
                    break;
                }
            }

            self.set_mode_async(Mode::Standby).await?;

            let mut raw = [0; 2];
            self.device.read_burst_async(FIFO, &mut raw).await?;
            let header = FrameHeader::parse(raw);

            if !header.is_for(self.address) {
                trace!("dropping frame for {=u8}", header.target);
                continue;
            }
            if !header.is_well_formed() {
                warn!("dropping frame with length {=u8}", header.length);
                continue;
            }

            let mut body = [0; MAX_FRAME_LEN];
            let body = &mut body[..header.body_len()];
            self.device.read_burst_async(FIFO, body).await?;

            return Ok(Packet::decode(header, body));
        }
    }

    async fn restart_rx_async(&mut self) -> Result<(), Error<SPI::Error>> {
        let mut config: PacketConfig2 = self.device.read_register_async().await?;
        config.flags.insert(PacketConfig2Flags::RX_RESTART);
        self.device.write_register_async(config).await
    }

    async fn payload_ready_async(&mut self) -> Result<bool, Error<SPI::Error>> {
        let irq: IrqFlags2 = self.device.read_register_async().await?;
        Ok(irq.flags.contains(Irq2::PAYLOAD_READY))
    }

    async fn is_set_async(&mut self, flag: WaitFor) -> Result<bool, Error<SPI::Error>> {
        Ok(match flag {
            WaitFor::ModeReady => {
                let irq: IrqFlags1 = self.device.read_register_async().await?;
                irq.flags.contains(Irq1::MODE_READY)
            }
            WaitFor::PacketSent => {
                let irq: IrqFlags2 = self.device.read_register_async().await?;
                irq.flags.contains(Irq2::PACKET_SENT)
            }
            WaitFor::RssiDone => {
                let rssi: RssiConfig = self.device.read_register_async().await?;
                rssi.flags.contains(RssiFlags::DONE)
            }
        })
    }

    async fn wait_for_async(&mut self, flag: WaitFor) -> Result<(), Error<SPI::Error>> {
        let mut budget = PollBudget::new(flag.limit(&self.config));
        while !self.is_set_async(flag).await? {
            if !budget.tick() {
                warn!("timed out waiting for {}", flag);
                return Err(flag.timeout());
            }
        }
        Ok(())
    }
}

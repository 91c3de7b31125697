//! Driver error type

use core::fmt;

/// Error type for frequency values that do not map to a supported [`Band`](crate::Band)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidFrequency(pub u16);

/// Error type for raw OPMODE values that do not correspond to a [`Mode`](crate::Mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidMode(pub u8);

/// Errors returned by the RFM69 driver.
///
/// `E` is the error type of the underlying SPI device. Bus failures are never
/// retried by the driver and surface as [`Error::Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// SPI transaction failed
    Transport(E),
    /// Frequency (in MHz) is not one of the supported bands
    InvalidFrequency(u16),
    /// Mode bits read from the chip do not decode to a known mode
    InvalidMode(u8),
    /// The chip never echoed the sync handshake sentinel
    SyncTimeout,
    /// ModeReady was not raised within the configured poll limit
    ModeReadyTimeout,
    /// PacketSent was not raised within the configured poll limit
    SendTimeout,
    /// RssiDone was not raised within the configured poll limit
    RssiTimeout,
    /// Register contents could not be decoded into the requested type
    Decode,
}

impl<E> From<InvalidFrequency> for Error<E> {
    fn from(value: InvalidFrequency) -> Self {
        Self::InvalidFrequency(value.0)
    }
}

impl<E> From<InvalidMode> for Error<E> {
    fn from(value: InvalidMode) -> Self {
        Self::InvalidMode(value.0)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "SPI transport error: {e:?}"),
            Self::InvalidFrequency(mhz) => write!(f, "unsupported frequency: {mhz} MHz"),
            Self::InvalidMode(bits) => write!(f, "invalid operating mode bits: {bits:#04x}"),
            Self::SyncTimeout => f.write_str("radio did not answer the bus sync handshake"),
            Self::ModeReadyTimeout => f.write_str("timed out waiting for ModeReady"),
            Self::SendTimeout => f.write_str("timed out waiting for PacketSent"),
            Self::RssiTimeout => f.write_str("timed out waiting for RssiDone"),
            Self::Decode => f.write_str("failed to decode register value"),
        }
    }
}

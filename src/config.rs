//! Driver configuration
//!
//! [`Band`] selects the carrier frequency programmed during initialization.
//! [`Config`] bounds the busy-wait loops the driver runs against the chip's
//! status flags. Every limit counts register polls, not time: how long a poll
//! takes depends on the SPI clock and the settle delay.

use crate::InvalidFrequency;

/// Supported carrier frequency bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Band {
    /// 315 MHz
    Mhz315,
    /// 433 MHz
    Mhz433,
    /// 868 MHz
    Mhz868,
    /// 915 MHz
    Mhz915,
}

impl Band {
    /// RegFrfMsb, RegFrfMid, RegFrfLsb values for this band
    pub const fn frf(self) -> [u8; 3] {
        match self {
            Self::Mhz315 => [0x4E, 0xC0, 0x00],
            Self::Mhz433 => [0x6C, 0x40, 0x00],
            Self::Mhz868 => [0xD9, 0x00, 0x00],
            Self::Mhz915 => [0xE4, 0xC0, 0x00],
        }
    }

    /// Nominal frequency in MHz
    pub const fn mhz(self) -> u16 {
        match self {
            Self::Mhz315 => 315,
            Self::Mhz433 => 433,
            Self::Mhz868 => 868,
            Self::Mhz915 => 915,
        }
    }
}

impl TryFrom<u16> for Band {
    type Error = InvalidFrequency;

    fn try_from(mhz: u16) -> Result<Self, Self::Error> {
        match mhz {
            315 => Ok(Self::Mhz315),
            433 => Ok(Self::Mhz433),
            868 => Ok(Self::Mhz868),
            915 => Ok(Self::Mhz915),
            invalid => Err(InvalidFrequency(invalid)),
        }
    }
}

/// Poll limits for the driver's blocking waits.
///
/// `None` polls forever, which will hang on an unresponsive chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Write/read-back attempts per sentinel during the bus sync handshake
    pub sync_attempts: Option<u32>,
    /// Polls of ModeReady after a mode change that requires it
    pub mode_ready_polls: Option<u32>,
    /// Polls of PacketSent after entering transmit
    pub packet_sent_polls: Option<u32>,
    /// Polls of RssiDone after a forced RSSI measurement
    pub rssi_polls: Option<u32>,
}

impl Config {
    /// Configuration that never gives up waiting on the chip.
    pub const fn unbounded() -> Self {
        Self {
            sync_attempts: None,
            mode_ready_polls: None,
            packet_sent_polls: None,
            rssi_polls: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync_attempts: Some(1_000),
            mode_ready_polls: Some(10_000),
            packet_sent_polls: Some(100_000),
            rssi_polls: Some(10_000),
        }
    }
}

/// Countdown over an optional poll limit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PollBudget {
    remaining: Option<u32>,
}

impl PollBudget {
    pub(crate) fn new(limit: Option<u32>) -> Self {
        Self { remaining: limit }
    }

    /// Consumes one poll. Returns `false` once the limit is used up.
    pub(crate) fn tick(&mut self) -> bool {
        match &mut self.remaining {
            None => true,
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_from_mhz() {
        assert_eq!(Band::try_from(433u16), Ok(Band::Mhz433));
        assert_eq!(Band::try_from(434u16), Err(InvalidFrequency(434)));
        for band in [Band::Mhz315, Band::Mhz433, Band::Mhz868, Band::Mhz915] {
            assert_eq!(Band::try_from(band.mhz()), Ok(band));
        }
    }

    #[test]
    fn band_triples_are_distinct() {
        assert_ne!(Band::Mhz868.frf(), Band::Mhz915.frf());
        assert_eq!(Band::Mhz315.frf(), [0x4E, 0xC0, 0x00]);
        assert_eq!(Band::Mhz433.frf(), [0x6C, 0x40, 0x00]);
    }

    #[test]
    fn budget_counts_down() {
        let mut budget = PollBudget::new(Some(2));
        assert!(budget.tick());
        assert!(budget.tick());
        assert!(!budget.tick());
        assert!(!budget.tick());
    }

    #[test]
    fn unbounded_budget_never_expires() {
        let mut budget = PollBudget::new(Config::unbounded().mode_ready_polls);
        assert!((0..100_000).all(|_| budget.tick()));
    }
}

mod common;

use common::*;
use embassy_futures::block_on;
use rfm69::packet::{Frame, ACK_REQUEST};
use rfm69::{Band, Config, Error, Mode, Rfm69};

fn radio() -> (Rfm69<FakeSpi, NoDelay>, FakeSpi) {
    let spi = FakeSpi::default();
    let mut radio = block_on(Rfm69::initialize_async(
        spi.clone(),
        NoDelay,
        Band::Mhz433,
        7,
        Config::default(),
    ))
    .unwrap();
    block_on(radio.set_address_async(1)).unwrap();
    (radio, spi)
}

#[test]
fn init_matches_blocking_sequence() {
    let (radio, async_spi) = radio();
    let blocking_spi = FakeSpi::default();
    let mut blocking =
        Rfm69::initialize(blocking_spi.clone(), NoDelay, Band::Mhz433, 7, Config::default())
            .unwrap();
    blocking.set_address(1).unwrap();

    assert_eq!(async_spi.chip().writes, blocking_spi.chip().writes);
    assert_eq!(radio.mode(), Some(Mode::Standby));
    assert_eq!(async_spi.chip().reg(REG_FRF), 0x6C);
}

#[test]
fn send_and_receive() {
    let (mut radio, spi) = radio();

    block_on(radio.send_async(5, b"async", false)).unwrap();
    assert_eq!(spi.chip().sent, vec![vec![8, 5, 1, 0, b'a', b's', b'y', b'n', b'c']]);

    let frame = Frame::new(1, 5, true, b"reply");
    spi.chip().incoming.push_back(frame.as_bytes().to_vec());

    let packet = block_on(radio.receive_async(100)).unwrap();
    assert_eq!(packet.sender, 5);
    assert_eq!(packet.control, ACK_REQUEST);
    assert_eq!(packet.payload(), b"reply");
}

#[test]
fn receive_times_out() {
    let (mut radio, _spi) = radio();

    let packet = block_on(radio.receive_async(10)).unwrap();
    assert!(packet.is_empty());
    assert_eq!(radio.mode(), Some(Mode::Standby));
}

#[test]
fn power_key_and_rssi() {
    let (mut radio, spi) = radio();

    block_on(radio.set_power_async(99)).unwrap();
    assert_eq!(radio.power(), Some(31));
    assert_eq!(spi.chip().reg(REG_PALEVEL) & 0x1F, 31);

    block_on(radio.set_encryption_key_async(Some(&[0x11; 16]))).unwrap();
    assert_eq!(spi.chip().reg(REG_PACKETCONFIG2) & 0x01, 1);
    block_on(radio.set_encryption_key_async(None)).unwrap();
    assert_eq!(spi.chip().reg(REG_PACKETCONFIG2) & 0x01, 0);

    spi.chip().regs[REG_RSSIVALUE as usize] = 41;
    assert_eq!(block_on(radio.read_rssi_async(true)), Ok(-1));
}

#[test]
fn waking_from_sleep_times_out() {
    let spi = FakeSpi::default();
    let config = Config {
        mode_ready_polls: Some(1),
        ..Config::default()
    };
    let mut radio =
        block_on(Rfm69::initialize_async(spi.clone(), NoDelay, Band::Mhz868, 1, config)).unwrap();

    block_on(radio.sleep_async()).unwrap();
    spi.chip().mode_ready_stuck = true;

    assert_eq!(
        block_on(radio.set_mode_async(Mode::Standby)),
        Err(Error::ModeReadyTimeout)
    );
    assert_eq!(block_on(radio.read_mode_async()), Ok(Mode::Standby));
}

#[test]
fn power_down_releases_bus() {
    let (radio, spi) = radio();

    block_on(radio.power_down_async()).unwrap();
    assert_eq!(spi.chip().mode_bits(), Mode::Sleep.bits());
}

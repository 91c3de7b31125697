//! Packet framing
//!
//! Frames use the chip's variable length packet format. On the air, after the
//! preamble and sync word, each frame is:
//!
//! | length | target | sender | control | payload (0..=61 bytes) |
//!
//! The length byte counts everything after itself, so it is `payload + 3`.
//! The CRC is appended and checked by the chip and never reaches the FIFO.
//!
//! Receiving reads the frame back in two FIFO bursts: first the length and
//! target bytes, to decide whether the frame is for us, then the remaining
//! `length - 1` bytes. On the wire that second burst is `length` bytes long
//! because it starts with the FIFO address byte, which is why the payload
//! comes out as `length - 3` bytes and not `length - 2`.

/// Largest payload a frame can carry
pub const MAX_PAYLOAD_LEN: usize = 61;

/// Bytes counted by the length field besides the payload: target, sender and control
pub const FRAME_OVERHEAD: usize = 3;

/// Largest value accepted in the length field
pub const MAX_FRAME_LEN: usize = MAX_PAYLOAD_LEN + FRAME_OVERHEAD;

/// Target address accepted by every receiver
pub const BROADCAST_ADDRESS: u8 = 255;

/// Control bit asking the receiver to acknowledge
pub const ACK_REQUEST: u8 = 0x40;

/// A received packet.
///
/// An empty payload means nothing arrived before the receive timeout; see
/// [`Packet::is_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    /// Address of the originating node
    pub sender: u8,
    /// Control byte, passed through as sent
    pub control: u8,
    len: u8,
    data: [u8; MAX_PAYLOAD_LEN],
}

impl Packet {
    /// The "nothing received" packet
    pub const fn empty() -> Self {
        Self {
            sender: 0,
            control: 0,
            len: 0,
            data: [0; MAX_PAYLOAD_LEN],
        }
    }

    /// Builds a packet, truncating `payload` to [`MAX_PAYLOAD_LEN`].
    pub fn new(sender: u8, control: u8, payload: &[u8]) -> Self {
        let len = payload.len().min(MAX_PAYLOAD_LEN);
        let mut data = [0; MAX_PAYLOAD_LEN];
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            sender,
            control,
            len: len as u8,
            data,
        }
    }

    /// Decodes the second FIFO burst of a received frame.
    ///
    /// `body` holds sender, control and payload. Only the first
    /// `header.body_len()` bytes are used.
    pub fn decode(header: FrameHeader, body: &[u8]) -> Self {
        let body = &body[..header.body_len().min(body.len())];
        match body {
            [sender, control, payload @ ..] => Self::new(*sender, *control, payload),
            _ => Self::empty(),
        }
    }

    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.data[..usize::from(self.len)]
    }

    /// Payload length
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// True when the receive timed out without a frame
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the sender asked for an acknowledgement
    pub fn ack_requested(&self) -> bool {
        self.control & ACK_REQUEST != 0
    }
}

impl Default for Packet {
    fn default() -> Self {
        Self::empty()
    }
}

/// First two bytes of a received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Length field, clamped to [`MAX_FRAME_LEN`]
    pub length: u8,
    /// Address the frame is for
    pub target: u8,
}

impl FrameHeader {
    /// Parses the length and target bytes, clamping an oversized length.
    pub fn parse(bytes: [u8; 2]) -> Self {
        Self {
            length: bytes[0].min(MAX_FRAME_LEN as u8),
            target: bytes[1],
        }
    }

    /// True if the frame is for `node` or broadcast.
    ///
    /// Without a node address only broadcasts are accepted.
    pub fn is_for(&self, node: Option<u8>) -> bool {
        self.target == BROADCAST_ADDRESS || Some(self.target) == node
    }

    /// True if the length field covers at least target, sender and control.
    pub fn is_well_formed(&self) -> bool {
        usize::from(self.length) >= FRAME_OVERHEAD
    }

    /// Bytes still in the FIFO after the header: sender, control and payload.
    pub fn body_len(&self) -> usize {
        usize::from(self.length).saturating_sub(1)
    }
}

/// Outgoing frame, laid out as written to the FIFO.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    buf: [u8; MAX_FRAME_LEN + 1],
    len: usize,
}

impl Frame {
    /// Encodes a frame from `sender` to `target`.
    ///
    /// `payload` is silently truncated to [`MAX_PAYLOAD_LEN`].
    pub fn new(target: u8, sender: u8, request_ack: bool, payload: &[u8]) -> Self {
        let payload = &payload[..payload.len().min(MAX_PAYLOAD_LEN)];
        let mut buf = [0; MAX_FRAME_LEN + 1];

        buf[0] = (payload.len() + FRAME_OVERHEAD) as u8;
        buf[1] = target;
        buf[2] = sender;
        buf[3] = if request_ack { ACK_REQUEST } else { 0 };
        buf[4..4 + payload.len()].copy_from_slice(payload);

        Self {
            buf,
            len: payload.len() + FRAME_OVERHEAD + 1,
        }
    }

    /// Bytes to push into the FIFO
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

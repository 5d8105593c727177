//! MAVLink 1 frame layout, streaming decoder, and encoder.

use crate::protocol::crc;
use crate::protocol::messages::Message;

/// Frame start marker.
pub const STX: u8 = 0xFE;

/// Header length, start marker included.
pub const HEADER_LEN: usize = 6;

/// Checksum trailer length.
pub const CHECKSUM_LEN: usize = 2;

/// Largest possible frame on the wire.
const MAX_FRAME_LEN: usize = HEADER_LEN + 255 + CHECKSUM_LEN;

/// A decoded frame: header fields plus the raw payload.
///
/// The checksum trailer is validated during decoding and not retained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    /// Per-link sequence number, wrapping modulo 256. Gaps indicate frame loss.
    pub sequence: u8,
    /// System `ID` of the sender.
    pub system_id: u8,
    /// Component `ID` of the sender.
    pub component_id: u8,
    /// Message `ID`.
    pub message_id: u8,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

impl RawFrame {
    /// Decodes the payload into a typed [`Message`].
    pub fn decode(&self) -> Result<Message, crate::protocol::messages::PayloadError> {
        Message::decode(self.message_id, &self.payload)
    }
}

/// Streaming frame decoder.
///
/// Accepts arbitrary read chunks: a single chunk may contain zero, one, or many frames, and a
/// frame may span chunks. On a checksum mismatch the decoder discards exactly one byte and
/// resumes scanning, so corruption never costs more than the corrupted frame.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    bad_frames: u64,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends freshly read bytes to the internal buffer.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of frames rejected due to checksum mismatch so far.
    pub fn bad_frames(&self) -> u64 {
        self.bad_frames
    }

    /// Extracts the next complete, checksum-valid frame from the buffer.
    ///
    /// Returns `None` when more bytes are needed. Call repeatedly after each
    /// [`push_bytes`](Self::push_bytes) until it returns `None`.
    pub fn next_frame(&mut self) -> Option<RawFrame> {
        loop {
            // Drop noise before the next start marker.
            match self.buf.iter().position(|&b| b == STX) {
                Some(0) => {}
                Some(at) => {
                    self.buf.drain(..at);
                }
                None => {
                    self.buf.clear();
                    return None;
                }
            }

            if self.buf.len() < HEADER_LEN {
                return None;
            }

            let payload_len = self.buf[1] as usize;
            let frame_len = HEADER_LEN + payload_len + CHECKSUM_LEN;
            debug_assert!(frame_len <= MAX_FRAME_LEN);
            if self.buf.len() < frame_len {
                return None;
            }

            let message_id = self.buf[5];
            match crc::crc_extra(message_id) {
                Some(extra) => {
                    let computed = crc::compute(&self.buf[1..HEADER_LEN + payload_len], extra);
                    let received = u16::from_le_bytes([
                        self.buf[HEADER_LEN + payload_len],
                        self.buf[HEADER_LEN + payload_len + 1],
                    ]);
                    if computed != received {
                        self.bad_frames += 1;
                        log::trace!(
                            "frame checksum mismatch for message {message_id}: \
                             computed {computed:#06x}, received {received:#06x}"
                        );
                        self.buf.drain(..1);
                        continue;
                    }
                }
                // The seed is unknown for unsupported ids, so the trailer cannot be
                // validated. The frame is still surfaced to avoid blocking the stream.
                None => {}
            }

            let frame = RawFrame {
                sequence: self.buf[2],
                system_id: self.buf[3],
                component_id: self.buf[4],
                message_id,
                payload: self.buf[HEADER_LEN..HEADER_LEN + payload_len].to_vec(),
            };
            self.buf.drain(..frame_len);
            return Some(frame);
        }
    }
}

/// Frame encoder with a wrapping per-link sequence counter.
#[derive(Debug)]
pub struct FrameEncoder {
    sequence: u8,
    system_id: u8,
    component_id: u8,
}

impl FrameEncoder {
    /// Creates an encoder stamping frames with the given sender identity.
    pub fn new(system_id: u8, component_id: u8) -> Self {
        Self {
            sequence: 0,
            system_id,
            component_id,
        }
    }

    /// Serializes a message into a complete frame.
    ///
    /// Returns the assigned sequence number and the frame bytes. [`Message::Unknown`] cannot be
    /// encoded since its checksum seed is unknown.
    pub fn encode(&mut self, message: &Message) -> crate::errors::Result<(u8, Vec<u8>)> {
        let id = message.id();
        let extra = crc::crc_extra(id).ok_or_else(|| {
            crate::errors::Error::ProtocolViolation(format!(
                "cannot encode message with unsupported id {id}"
            ))
        })?;

        let payload = message.encode_payload();
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);

        let mut frame = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
        frame.push(STX);
        frame.push(payload.len() as u8);
        frame.push(sequence);
        frame.push(self.system_id);
        frame.push(self.component_id);
        frame.push(id);
        frame.extend_from_slice(&payload);

        let checksum = crc::compute(&frame[1..], extra);
        frame.extend_from_slice(&checksum.to_le_bytes());

        Ok((sequence, frame))
    }
}

#[cfg(test)]
mod test_frame {
    use super::*;
    use crate::protocol::messages::{Heartbeat, Message};

    fn heartbeat(custom_mode: u32) -> Message {
        Message::Heartbeat(Heartbeat {
            custom_mode,
            type_: 2,
            autopilot: 3,
            base_mode: 81,
            system_status: 4,
            mavlink_version: 3,
        })
    }

    #[test]
    fn encode_then_decode_preserves_frame() {
        let mut encoder = FrameEncoder::new(1, 1);
        let message = heartbeat(4);
        let (sequence, bytes) = encoder.encode(&message).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.push_bytes(&bytes);
        let frame = decoder.next_frame().expect("one frame");

        assert_eq!(frame.sequence, sequence);
        assert_eq!(frame.system_id, 1);
        assert_eq!(frame.component_id, 1);
        assert_eq!(frame.message_id, 0);
        assert_eq!(frame.decode().unwrap(), message);
        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn frames_may_span_reads() {
        let mut encoder = FrameEncoder::new(1, 1);
        let (_, bytes) = encoder.encode(&heartbeat(0)).unwrap();

        let mut decoder = FrameDecoder::new();
        for byte in &bytes[..bytes.len() - 1] {
            decoder.push_bytes(&[*byte]);
            assert!(decoder.next_frame().is_none());
        }
        decoder.push_bytes(&bytes[bytes.len() - 1..]);
        assert!(decoder.next_frame().is_some());
    }

    #[test]
    fn one_read_may_contain_many_frames() {
        let mut encoder = FrameEncoder::new(1, 1);
        let mut stream = Vec::new();
        for mode in 0..5u32 {
            let (_, bytes) = encoder.encode(&heartbeat(mode)).unwrap();
            stream.extend_from_slice(&bytes);
        }

        let mut decoder = FrameDecoder::new();
        decoder.push_bytes(&stream);
        for expected in 0..5u8 {
            let frame = decoder.next_frame().expect("frame");
            assert_eq!(frame.sequence, expected);
        }
        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn corruption_loses_exactly_one_frame() {
        let mut encoder = FrameEncoder::new(1, 1);
        let (_, mut first) = encoder.encode(&heartbeat(5)).unwrap();
        let (_, second) = encoder.encode(&heartbeat(6)).unwrap();

        // Flip one payload byte in the first frame.
        first[HEADER_LEN] ^= 0xFF;

        let mut decoder = FrameDecoder::new();
        decoder.push_bytes(&first);
        decoder.push_bytes(&second);

        let frame = decoder.next_frame().expect("second frame survives");
        assert_eq!(frame.sequence, 1);
        assert_eq!(frame.decode().unwrap(), heartbeat(6));
        assert!(decoder.next_frame().is_none());
        assert_eq!(decoder.bad_frames(), 1);
    }

    #[test]
    fn leading_noise_is_skipped() {
        let mut encoder = FrameEncoder::new(1, 1);
        let (_, bytes) = encoder.encode(&heartbeat(0)).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.push_bytes(&[0x00, 0x42, 0x17]);
        decoder.push_bytes(&bytes);
        assert!(decoder.next_frame().is_some());
    }

    #[test]
    fn sequence_wraps_modulo_256() {
        let mut encoder = FrameEncoder::new(1, 1);
        let mut last = 0;
        for _ in 0..=256 {
            let (sequence, _) = encoder.encode(&heartbeat(0)).unwrap();
            last = sequence;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn unknown_id_passes_through_with_raw_payload() {
        // Hand-build a frame with an unsupported id; trailer is not validated.
        let payload = [0xAA, 0xBB, 0xCC];
        let mut bytes = vec![STX, 3, 7, 1, 1, 200];
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(&[0x00, 0x00]);

        let mut decoder = FrameDecoder::new();
        decoder.push_bytes(&bytes);
        let frame = decoder.next_frame().expect("frame");
        assert_eq!(frame.message_id, 200);
        assert_eq!(
            frame.decode().unwrap(),
            Message::Unknown {
                id: 200,
                payload: payload.to_vec()
            }
        );
    }
}

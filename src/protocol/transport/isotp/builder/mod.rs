//! CAN frame generator for ISO-TP messages. Lazily builds the Single frame or
//! the First + Consecutive sequence for an application payload.
use core::convert::Infallible;

use crate::error::IsoTpError;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;
use crate::protocol::transport::isotp::{
    IsoTpMode, CONSECUTIVE_FRAME_DATA, FIRST_FRAME_DATA, MAX_ISOTP_PAYLOAD, SINGLE_FRAME_MAX,
};

#[derive(Debug, Clone, Copy)]
/// Shared parameters for all frames composing one ISO-TP message.
pub struct IsoTpBuilder<'a> {
    id: CanId,
    payload: &'a [u8],
}

/// Lazy iterator returning frames one by one as they are encoded.
#[derive(Debug)]
pub struct FrameIterator<'a> {
    builder: IsoTpBuilder<'a>,
    sequence: u8,
    bytes_sent: usize,
}

impl<'a> IsoTpBuilder<'a> {
    /// Prepare a message for `id`. Payloads beyond 4095 bytes cannot be announced.
    pub fn new(id: CanId, payload: &'a [u8]) -> Result<Self, IsoTpError<Infallible>> {
        if payload.len() > MAX_ISOTP_PAYLOAD {
            return Err(IsoTpError::PayloadTooLarge { len: payload.len() });
        }
        Ok(Self { id, payload })
    }

    /// `true` when the payload needs First + Consecutive frames.
    pub fn is_segmented(&self) -> bool {
        self.payload.len() > SINGLE_FRAME_MAX
    }

    /// Number of frames the message will produce. An empty payload produces none.
    pub fn frame_count(&self) -> usize {
        match self.payload.len() {
            0 => 0,
            len if len <= SINGLE_FRAME_MAX => 1,
            len => 1 + (len - FIRST_FRAME_DATA).div_ceil(CONSECUTIVE_FRAME_DATA),
        }
    }

    /// Start the iteration; each call to `next` yields the next frame.
    pub fn build(self) -> FrameIterator<'a> {
        FrameIterator {
            builder: self,
            sequence: 1,
            bytes_sent: 0,
        }
    }
}

impl<'a> Iterator for FrameIterator<'a> {
    type Item = CanFrame;

    fn next(&mut self) -> Option<Self::Item> {
        let payload = self.builder.payload;
        let total_len = payload.len();
        if self.bytes_sent >= total_len {
            return None;
        }

        let mut data = [0u8; 8];

        // Single frame: PCI carries the length.
        if total_len <= SINGLE_FRAME_MAX {
            data[0] = IsoTpMode::Single.pci() | total_len as u8;
            data[1..1 + total_len].copy_from_slice(payload);
            self.bytes_sent = total_len;
            return Some(CanFrame {
                id: self.builder.id,
                data,
                len: 1 + total_len,
            });
        }

        let frame = if self.bytes_sent == 0 {
            // First frame: 12-bit length, then six payload bytes.
            data[0] = IsoTpMode::First.pci() | ((total_len >> 8) as u8 & 0x0F);
            data[1] = (total_len & 0xFF) as u8;
            data[2..2 + FIRST_FRAME_DATA].copy_from_slice(&payload[..FIRST_FRAME_DATA]);
            self.bytes_sent = FIRST_FRAME_DATA;
            CanFrame {
                id: self.builder.id,
                data,
                len: 8,
            }
        } else {
            let chunk_len = CONSECUTIVE_FRAME_DATA.min(total_len - self.bytes_sent);
            data[0] = IsoTpMode::Consecutive.pci() | (self.sequence & 0x0F);
            data[1..1 + chunk_len]
                .copy_from_slice(&payload[self.bytes_sent..self.bytes_sent + chunk_len]);
            self.bytes_sent += chunk_len;
            self.sequence = (self.sequence + 1) & 0x0F;
            CanFrame {
                id: self.builder.id,
                data,
                len: 1 + chunk_len,
            }
        };

        Some(frame)
    }
}

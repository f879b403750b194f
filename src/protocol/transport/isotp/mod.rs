//! ISO-TP style segmentation: payloads larger than one CAN frame travel as a
//! First frame followed by Consecutive frames, paced by Flow-control frames
//! from the receiver.
//!
//! Every frame starts with a protocol control byte whose upper nibble is the
//! [`IsoTpMode`]:
//!
//! ```text
//! Single       [0x0L, d0..dL]            L = 1..=7
//! First        [0x1H, LL, d0..d5]        length = 0xHLL, 8..=4095
//! Consecutive  [0x2S, d.. (max 7)]       S = sequence, 1, 2, .., 15, 0, 1, ..
//! Flow         [0x3F, BS, STmin]         F = status
//! ```
use embassy_time::Duration;

use crate::protocol::transport::{can_frame::CanFrame, can_id::CanId};

pub mod assembler;
pub mod builder;
pub mod flow;


/// Largest payload a First frame can announce (12-bit length).
pub const MAX_ISOTP_PAYLOAD: usize = 4095;
/// Largest payload carried by a Single frame.
pub const SINGLE_FRAME_MAX: usize = 7;
/// Payload bytes carried by a First frame.
pub const FIRST_FRAME_DATA: usize = 6;
/// Payload bytes carried by a full Consecutive frame.
pub const CONSECUTIVE_FRAME_DATA: usize = 7;
/// How long a paced sender waits for a Flow-control frame (N_Bs).
pub const FLOW_CONTROL_TIMEOUT_MS: u64 = 1000;
/// Consecutive `Wait` flow-control frames tolerated before giving up.
pub const MAX_FLOW_WAIT_FRAMES: u8 = 8;

//==================================================================================MODE
/// Role of a frame inside an ISO-TP exchange (upper nibble of byte 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IsoTpMode {
    /// Payload fits in one frame.
    Single = 0,
    /// Opening frame of a multi-frame message, carries the total length.
    First = 1,
    /// Continuation frame with a 4-bit sequence number.
    Consecutive = 2,
    /// Receiver feedback pacing the consecutive frames.
    Flow = 3,
}

impl IsoTpMode {
    /// Decode the protocol control byte.
    pub const fn from_pci(pci: u8) -> Option<Self> {
        match pci >> 4 {
            0 => Some(IsoTpMode::Single),
            1 => Some(IsoTpMode::First),
            2 => Some(IsoTpMode::Consecutive),
            3 => Some(IsoTpMode::Flow),
            _ => None,
        }
    }

    /// Upper nibble of the protocol control byte.
    pub const fn pci(self) -> u8 {
        (self as u8) << 4
    }
}

//==================================================================================FLOW_CONTROL
/// Flow status announced by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FlowStatus {
    /// Send the next block.
    ClearToSend = 0,
    /// Hold on and wait for another flow-control frame.
    Wait = 1,
    /// Message does not fit the receiver buffer; abort.
    Overflow = 2,
}

/// Parsed Flow-control frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlowControl {
    pub status: FlowStatus,
    /// Consecutive frames allowed before the next flow-control frame. `0` = unlimited.
    pub block_size: u8,
    /// Minimum separation time, encoded (see [`FlowControl::separation_time`]).
    pub st_min: u8,
}

impl FlowControl {
    /// Grant `block_size` frames spaced by `st_min`.
    pub const fn clear_to_send(block_size: u8, st_min: u8) -> Self {
        Self {
            status: FlowStatus::ClearToSend,
            block_size,
            st_min,
        }
    }

    /// Ask the sender to keep waiting.
    pub const fn wait() -> Self {
        Self {
            status: FlowStatus::Wait,
            block_size: 0,
            st_min: 0,
        }
    }

    /// Refuse the message.
    pub const fn overflow() -> Self {
        Self {
            status: FlowStatus::Overflow,
            block_size: 0,
            st_min: 0,
        }
    }

    /// Decoded STmin: `0x00..=0x7F` milliseconds, `0xF1..=0xF9` 100 to 900 µs,
    /// reserved values fall back to the 127 ms maximum.
    pub fn separation_time(&self) -> Duration {
        match self.st_min {
            ms @ 0x00..=0x7F => Duration::from_millis(ms as u64),
            us @ 0xF1..=0xF9 => Duration::from_micros((us - 0xF0) as u64 * 100),
            _ => Duration::from_millis(0x7F),
        }
    }

    /// Parse the payload of a received frame; `None` if it is not a valid Flow frame.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < 3 || IsoTpMode::from_pci(data[0]) != Some(IsoTpMode::Flow) {
            return None;
        }
        let status = match data[0] & 0x0F {
            0 => FlowStatus::ClearToSend,
            1 => FlowStatus::Wait,
            2 => FlowStatus::Overflow,
            _ => return None,
        };
        Some(Self {
            status,
            block_size: data[1],
            st_min: data[2],
        })
    }

    /// Three-byte Flow frame addressed to `id` (unpadded, like Single frames).
    pub fn encode(&self, id: CanId) -> CanFrame {
        let mut data = [0u8; 8];
        data[0] = IsoTpMode::Flow.pci() | self.status as u8;
        data[1] = self.block_size;
        data[2] = self.st_min;
        CanFrame { id, data, len: 3 }
    }
}

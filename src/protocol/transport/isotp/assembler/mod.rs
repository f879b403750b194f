//! ISO-TP receiver: rebuilds a message from its Single frame or from a
//! First frame and the Consecutive frames that follow, and tells the caller
//! when a Flow-control frame must be answered.
use crate::protocol::transport::isotp::{
    FlowControl, IsoTpMode, CONSECUTIVE_FRAME_DATA, FIRST_FRAME_DATA, MAX_ISOTP_PAYLOAD,
    SINGLE_FRAME_MAX,
};

//==================================================================================Enums and Structs
#[derive(Debug, PartialEq, Eq)]
pub enum ProcessResult<'a> {
    /// Frame not part of a reception (flow frame, stray consecutive frame, malformed PCI).
    Ignored,
    /// Frame stored; more consecutive frames are expected.
    FragmentConsumed,
    /// Frame stored; the caller must transmit this flow-control frame to the sender.
    SendFlowControl(FlowControl),
    /// Unexpected sequence number; the reception was abandoned.
    SequenceGap { expected: u8, received: u8 },
    /// Complete payload, valid until the next call.
    MessageComplete(&'a [u8]),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SessionState {
    Idle,
    Receiving,
}

/// Single-session receiver owning a `CAP`-byte reassembly buffer.
#[derive(Debug)]
pub struct IsoTpAssembler<const CAP: usize = MAX_ISOTP_PAYLOAD> {
    state: SessionState,
    buffer: [u8; CAP],
    expected_size: usize,
    current_size: usize,
    next_sequence: u8,
    block_size: u8,
    st_min: u8,
    frames_in_block: u8,
}

impl<const CAP: usize> Default for IsoTpAssembler<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> IsoTpAssembler<CAP> {
    const CAP_HOLDS_SINGLE_FRAME: () = assert!(CAP >= SINGLE_FRAME_MAX);

    /// Receiver granting unlimited blocks without separation time.
    pub const fn new() -> Self {
        Self::with_flow(0, 0)
    }

    /// Receiver announcing `block_size` frames per block spaced by `st_min`.
    pub const fn with_flow(block_size: u8, st_min: u8) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAP_HOLDS_SINGLE_FRAME;
        Self {
            state: SessionState::Idle,
            buffer: [0; CAP],
            expected_size: 0,
            current_size: 0,
            next_sequence: 1,
            block_size,
            st_min,
            frames_in_block: 0,
        }
    }

    /// `true` while a segmented message is partially received.
    pub fn in_progress(&self) -> bool {
        self.state == SessionState::Receiving
    }

    /// Drop any partial reception.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.expected_size = 0;
        self.current_size = 0;
        self.next_sequence = 1;
        self.frames_in_block = 0;
    }

    fn clear_to_send(&self) -> FlowControl {
        FlowControl::clear_to_send(self.block_size, self.st_min)
    }

    //==================================================================================Process Functions
    /// Feed the payload of one received frame.
    pub fn process_frame(&mut self, data: &[u8]) -> ProcessResult<'_> {
        let Some(&pci) = data.first() else {
            return ProcessResult::Ignored;
        };
        let Some(mode) = IsoTpMode::from_pci(pci) else {
            return ProcessResult::Ignored;
        };

        match mode {
            IsoTpMode::Single => {
                let len = (pci & 0x0F) as usize;
                if len == 0 || len > SINGLE_FRAME_MAX || len > data.len() - 1 {
                    return ProcessResult::Ignored;
                }
                // A Single frame aborts any reception in progress.
                self.reset();
                self.buffer[..len].copy_from_slice(&data[1..1 + len]);
                ProcessResult::MessageComplete(&self.buffer[..len])
            }
            IsoTpMode::First => {
                if data.len() < 2 + FIRST_FRAME_DATA {
                    return ProcessResult::Ignored;
                }
                let expected_size = (((pci & 0x0F) as usize) << 8) | data[1] as usize;
                if expected_size <= SINGLE_FRAME_MAX {
                    return ProcessResult::Ignored;
                }
                // A new First frame restarts the session.
                self.reset();
                if expected_size > CAP {
                    return ProcessResult::SendFlowControl(FlowControl::overflow());
                }
                self.buffer[..FIRST_FRAME_DATA].copy_from_slice(&data[2..2 + FIRST_FRAME_DATA]);
                self.state = SessionState::Receiving;
                self.expected_size = expected_size;
                self.current_size = FIRST_FRAME_DATA;
                ProcessResult::SendFlowControl(self.clear_to_send())
            }
            IsoTpMode::Consecutive => {
                if self.state != SessionState::Receiving {
                    return ProcessResult::Ignored;
                }
                let sequence = pci & 0x0F;
                if sequence != self.next_sequence {
                    let expected = self.next_sequence;
                    self.reset();
                    return ProcessResult::SequenceGap {
                        expected,
                        received: sequence,
                    };
                }

                let remaining = self.expected_size - self.current_size;
                let chunk_len = remaining
                    .min(CONSECUTIVE_FRAME_DATA)
                    .min(data.len() - 1);
                self.buffer[self.current_size..self.current_size + chunk_len]
                    .copy_from_slice(&data[1..1 + chunk_len]);
                self.current_size += chunk_len;
                self.next_sequence = (self.next_sequence + 1) & 0x0F;

                if self.current_size >= self.expected_size {
                    let len = self.expected_size;
                    self.reset();
                    return ProcessResult::MessageComplete(&self.buffer[..len]);
                }

                self.frames_in_block = self.frames_in_block.wrapping_add(1);
                if self.block_size != 0 && self.frames_in_block >= self.block_size {
                    self.frames_in_block = 0;
                    return ProcessResult::SendFlowControl(self.clear_to_send());
                }
                ProcessResult::FragmentConsumed
            }
            IsoTpMode::Flow => ProcessResult::Ignored,
        }
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

//! In-memory representation of a classic CAN data frame, the descriptor
//! exchanged with the frame transport in both directions.
use crate::protocol::transport::can_id::CanId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Raw CAN frame as read from or written to the bus.
pub struct CanFrame {
    /// Identifier, including the extended-format flag.
    pub id: CanId,
    /// Payload buffer. Classic CAN frames always provide eight bytes.
    pub data: [u8; 8],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

impl CanFrame {
    /// Largest classic CAN payload.
    pub const MAX_DATA: usize = 8;

    /// Frame carrying `payload`; `None` when it exceeds eight bytes.
    pub fn new(id: CanId, payload: &[u8]) -> Option<Self> {
        if payload.len() > Self::MAX_DATA {
            return None;
        }
        let mut data = [0u8; 8];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            id,
            data,
            len: payload.len(),
        })
    }

    /// Zero-filled eight-byte frame, ready to be populated by the caller.
    pub const fn prepare_output(id: CanId) -> Self {
        Self {
            id,
            data: [0; 8],
            len: Self::MAX_DATA,
        }
    }

    /// Populated bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len.min(Self::MAX_DATA)]
    }

    /// Copy a HAL frame. Remote frames carry no data and are rejected.
    pub fn from_frame<F: embedded_can::Frame>(frame: &F) -> Option<Self> {
        if frame.is_remote_frame() {
            return None;
        }
        Self::new(frame.id().into(), frame.data())
    }

    /// Build the HAL frame type of a driver from this frame.
    pub fn to_frame<F: embedded_can::Frame>(&self) -> Option<F> {
        F::new(embedded_can::Id::from(self.id), self.payload())
    }
}

impl embedded_can::Frame for CanFrame {
    fn new(id: impl Into<embedded_can::Id>, data: &[u8]) -> Option<Self> {
        CanFrame::new(CanId::from(id.into()), data)
    }

    fn new_remote(_id: impl Into<embedded_can::Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        self.id.is_extended()
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> embedded_can::Id {
        self.id.into()
    }

    fn dlc(&self) -> usize {
        self.len.min(Self::MAX_DATA)
    }

    fn data(&self) -> &[u8] {
        self.payload()
    }
}

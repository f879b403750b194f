//! Anything able to put a frame on a bus. Protocol helpers that need no bus
//! state (ISO-TP) are written against this trait.
use crate::protocol::transport::can_frame::CanFrame;

/// Fire-and-forget frame transmission.
pub trait FrameSender {
    type Error: core::fmt::Debug;

    /// Hand one frame to the bus. Never blocks.
    fn send_frame(&self, frame: &CanFrame) -> Result<(), Self::Error>;
}

//! Hardware boundary: the CAN controller driver the bus hands frames to and
//! programs filters on. Receiving is owned by the driver, which feeds
//! [`CanHandler::process`](crate::protocol::dispatch::bus::CanHandler::process)
//! from its interrupt or polling loop.
use crate::protocol::dispatch::registry::MailboxFilter;
use crate::protocol::transport::can_frame::CanFrame;

/// Contract of a CAN controller. Every call must return without waiting:
/// a full transmit queue is reported as an error, never awaited.
pub trait FrameTransport {
    type Error: core::fmt::Debug;

    /// Queue a frame for transmission.
    fn transmit(&mut self, frame: &CanFrame) -> Result<(), Self::Error>;

    /// Program (`Some`) or disable (`None`) the acceptance filter of a mailbox.
    fn configure_mailbox(
        &mut self,
        mailbox: u8,
        filter: Option<&MailboxFilter>,
    ) -> Result<(), Self::Error>;

    /// Apply a bit-rate in kbit/s. `0` shuts the controller down.
    fn set_bitrate(&mut self, kbps: u32) -> Result<(), Self::Error>;
}

//! Simple I/O broadcast: switch, output and input states published on fixed
//! standard identifiers (`0x606..=0x609` in the shipped manifest).
use crate::core::IoChannel;
use crate::protocol::dispatch::registry::MailboxFilter;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;

impl IoChannel {
    pub fn can_id(self) -> CanId {
        CanId::standard_masked(self.id())
    }

    /// Filter accepting only this channel.
    pub fn filter(self) -> MailboxFilter {
        MailboxFilter::exact(self.can_id())
    }

    /// Channel a received frame belongs to.
    pub fn of_frame(frame: &CanFrame) -> Option<IoChannel> {
        if frame.id.is_extended() {
            return None;
        }
        IoChannel::from_id(frame.id.raw() as u16)
    }

    /// Broadcast frame carrying `payload` (at most eight bytes).
    pub fn frame(self, payload: &[u8]) -> Option<CanFrame> {
        CanFrame::new(self.can_id(), payload)
    }
}

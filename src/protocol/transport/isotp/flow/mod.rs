//! Observer bridging received Flow-control frames to a paced ISO-TP sender.
//!
//! Attach it on the identifier the peer answers on; every Flow frame it sees
//! is published on the shared [`Signal`] that
//! [`IsoTpSender::send_isotp_paced`](crate::protocol::transport::traits::isotp_sender::IsoTpSender::send_isotp_paced)
//! waits on.
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

use crate::protocol::dispatch::observer::{CanObserver, ObserverProfile};
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::isotp::FlowControl;

pub struct FlowControlObserver<'a, M: RawMutex> {
    profile: ObserverProfile,
    signal: &'a Signal<M, FlowControl>,
}

impl<'a, M: RawMutex> FlowControlObserver<'a, M> {
    pub const fn new(signal: &'a Signal<M, FlowControl>) -> Self {
        Self {
            profile: ObserverProfile::raw(),
            signal,
        }
    }
}

impl<M: RawMutex> CanObserver for FlowControlObserver<'_, M> {
    fn handle_can_frame(&mut self, frame: &CanFrame) {
        if let Some(control) = FlowControl::decode(frame.payload()) {
            self.signal.signal(control);
        }
    }

    fn profile(&self) -> &ObserverProfile {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut ObserverProfile {
        &mut self.profile
    }
}

//! Test doubles shared by the unit tests: a recording transport, a recording
//! observer and a counting diagnostics sink.
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::infra::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::protocol::canopen::sdo::SdoFrame;
use crate::protocol::dispatch::observer::{CanObserver, ObserverProfile};
use crate::protocol::dispatch::registry::MailboxFilter;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;
use crate::protocol::transport::traits::frame_transport::FrameTransport;

const LOG_CAPACITY: usize = 64;
const MAILBOX_SLOTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MockError;

/// Transport keeping everything it is asked to do.
pub(crate) struct MockTransport {
    log: [CanFrame; LOG_CAPACITY],
    log_len: usize,
    pub mailboxes: [Option<MailboxFilter>; MAILBOX_SLOTS],
    pub bitrate: Option<u32>,
    pub fail_transmit: bool,
    pub fail_configure: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            log: [CanFrame::prepare_output(CanId::cob(0, 0)); LOG_CAPACITY],
            log_len: 0,
            mailboxes: [None; MAILBOX_SLOTS],
            bitrate: None,
            fail_transmit: false,
            fail_configure: false,
        }
    }

    pub fn sent(&self) -> &[CanFrame] {
        &self.log[..self.log_len]
    }

    pub fn programmed_mailboxes(&self) -> usize {
        self.mailboxes.iter().flatten().count()
    }
}

impl FrameTransport for MockTransport {
    type Error = MockError;

    fn transmit(&mut self, frame: &CanFrame) -> Result<(), MockError> {
        if self.fail_transmit || self.log_len == LOG_CAPACITY {
            return Err(MockError);
        }
        self.log[self.log_len] = *frame;
        self.log_len += 1;
        Ok(())
    }

    fn configure_mailbox(
        &mut self,
        mailbox: u8,
        filter: Option<&MailboxFilter>,
    ) -> Result<(), MockError> {
        if self.fail_configure {
            return Err(MockError);
        }
        let slot = self.mailboxes.get_mut(mailbox as usize).ok_or(MockError)?;
        *slot = filter.copied();
        Ok(())
    }

    fn set_bitrate(&mut self, kbps: u32) -> Result<(), MockError> {
        self.bitrate = Some(kbps);
        Ok(())
    }
}

/// Observer counting calls per handler.
#[derive(Default)]
pub(crate) struct Recorder {
    pub profile: ObserverProfile,
    pub raw: usize,
    pub pdo: usize,
    pub sdo_requests: usize,
    pub sdo_responses: usize,
    pub last_frame: Option<CanFrame>,
    pub last_sdo: Option<SdoFrame>,
}

impl Recorder {
    pub fn canopen(node_id: u8) -> Self {
        Self {
            profile: ObserverProfile::canopen(node_id),
            ..Self::default()
        }
    }
}

impl CanObserver for Recorder {
    fn handle_can_frame(&mut self, frame: &CanFrame) {
        self.raw += 1;
        self.last_frame = Some(*frame);
    }

    fn handle_pdo_frame(&mut self, frame: &CanFrame) {
        self.pdo += 1;
        self.last_frame = Some(*frame);
    }

    fn handle_sdo_request(&mut self, frame: &SdoFrame) {
        self.sdo_requests += 1;
        self.last_sdo = Some(*frame);
    }

    fn handle_sdo_response(&mut self, frame: &SdoFrame) {
        self.sdo_responses += 1;
        self.last_sdo = Some(*frame);
    }

    fn profile(&self) -> &ObserverProfile {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut ObserverProfile {
        &mut self.profile
    }
}

/// Sink remembering how many events it got and the last breadcrumb.
#[derive(Default)]
pub(crate) struct CountingSink {
    pub count: AtomicUsize,
    pub last: AtomicU32,
}

impl CountingSink {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl DiagnosticSink for CountingSink {
    fn record(&self, event: DiagnosticEvent) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.last.store(event.breadcrumb(), Ordering::Relaxed);
    }
}

/// Test doubles to simulate a CAN controller, its peer and the timer during integration tests.
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::sleep;
use vcu_can::infra::diagnostics::{DiagnosticEvent, DiagnosticSink};
use vcu_can::protocol::{
    canopen::sdo::SdoFrame,
    dispatch::{
        observer::{CanObserver, ObserverProfile},
        registry::MailboxFilter,
    },
    transport::{
        can_frame::CanFrame,
        traits::{bus_timer::BusTimer, frame_transport::FrameTransport},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum MockError {
    /// The peer side of the wire was dropped.
    Disconnected,
    /// Refused on purpose by the test.
    Refused,
}

/// Controller state the test can inspect while the bus owns the transport.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct ControllerState {
    pub bitrate: Option<u32>,
    pub mailboxes: [Option<MailboxFilter>; 32],
    pub refuse_mailboxes: bool,
}

#[derive(Clone)]
#[allow(dead_code)]
/// In-memory CAN controller reproducing the `FrameTransport` behavior.
/// Transmitted frames travel to the matching [`Wire`]. Clones drive the same
/// controller, as CAR2 and single-wire do.
pub struct MockTransport {
    tx: mpsc::UnboundedSender<CanFrame>,
    state: Arc<Mutex<ControllerState>>,
}

#[allow(dead_code)]
/// Peer end of a [`MockTransport`]: everything the DUT transmitted.
pub struct Wire {
    rx: mpsc::UnboundedReceiver<CanFrame>,
    pub state: Arc<Mutex<ControllerState>>,
}

#[allow(dead_code)]
impl MockTransport {
    /// Construct a controller and the wire it transmits on (DUT ↔ host).
    pub fn create_pair() -> (Self, Wire) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(ControllerState::default()));
        (
            Self {
                tx,
                state: state.clone(),
            },
            Wire { rx, state },
        )
    }
}

impl FrameTransport for MockTransport {
    type Error = MockError;

    fn transmit(&mut self, frame: &CanFrame) -> Result<(), Self::Error> {
        self.tx.send(*frame).map_err(|_| MockError::Disconnected)
    }

    fn configure_mailbox(
        &mut self,
        mailbox: u8,
        filter: Option<&MailboxFilter>,
    ) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_mailboxes {
            return Err(MockError::Refused);
        }
        state.mailboxes[mailbox as usize] = filter.copied();
        Ok(())
    }

    fn set_bitrate(&mut self, kbps: u32) -> Result<(), Self::Error> {
        self.state.lock().unwrap().bitrate = Some(kbps);
        Ok(())
    }
}

#[allow(dead_code)]
impl Wire {
    /// Next transmitted frame, waiting for it.
    pub async fn recv(&mut self) -> CanFrame {
        self.rx.recv().await.expect("transport dropped")
    }

    /// Every frame transmitted so far, without waiting.
    pub fn drain(&mut self) -> Vec<CanFrame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    pub fn bitrate(&self) -> Option<u32> {
        self.state.lock().unwrap().bitrate
    }

    pub fn mailbox(&self, index: usize) -> Option<MailboxFilter> {
        self.state.lock().unwrap().mailboxes[index]
    }

    pub fn programmed_mailboxes(&self) -> usize {
        self.state.lock().unwrap().mailboxes.iter().flatten().count()
    }

    pub fn refuse_mailboxes(&self, refuse: bool) {
        self.state.lock().unwrap().refuse_mailboxes = refuse;
    }
}

#[allow(dead_code)]
/// Timer based on `tokio::time::sleep` to drive delays in tests.
pub struct MockTimer;

impl BusTimer for MockTimer {
    fn delay<'a>(
        &'a mut self,
        duration: embassy_time::Duration,
    ) -> impl core::future::Future<Output = ()> + 'a {
        sleep(std::time::Duration::from_micros(duration.as_micros()))
    }
}

#[derive(Debug, Default)]
#[allow(dead_code)]
/// Observer keeping a copy of everything delivered to it.
pub struct Collector {
    pub profile: ObserverProfile,
    pub frames: Vec<CanFrame>,
    pub pdos: Vec<CanFrame>,
    pub sdo_requests: Vec<SdoFrame>,
    pub sdo_responses: Vec<SdoFrame>,
}

#[allow(dead_code)]
impl Collector {
    pub fn canopen(node_id: u8) -> Self {
        Self {
            profile: ObserverProfile::canopen(node_id),
            ..Self::default()
        }
    }
}

impl CanObserver for Collector {
    fn handle_can_frame(&mut self, frame: &CanFrame) {
        self.frames.push(*frame);
    }

    fn handle_pdo_frame(&mut self, frame: &CanFrame) {
        self.pdos.push(*frame);
    }

    fn handle_sdo_request(&mut self, frame: &SdoFrame) {
        self.sdo_requests.push(*frame);
    }

    fn handle_sdo_response(&mut self, frame: &SdoFrame) {
        self.sdo_responses.push(*frame);
    }

    fn profile(&self) -> &ObserverProfile {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut ObserverProfile {
        &mut self.profile
    }
}

#[derive(Debug, Default)]
#[allow(dead_code)]
/// Diagnostics sink keeping every reported event.
pub struct EventLog(Mutex<Vec<DiagnosticEvent>>);

#[allow(dead_code)]
impl EventLog {
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl DiagnosticSink for EventLog {
    fn record(&self, event: DiagnosticEvent) {
        self.0.lock().unwrap().push(event);
    }
}

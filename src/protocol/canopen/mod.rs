//! CANopen-derived application layer: NMT commands, heartbeat, PDO and
//! expedited SDO, on top of a [`CanHandler`].
//!
//! Identifiers follow the pre-defined connection set: a standard identifier
//! is `function code + node ID`, the node ID being its seven low bits.
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::error::{CanOpenError, SendError};
use crate::infra::diagnostics::DiagnosticEvent;
use crate::protocol::dispatch::bus::CanHandler;
use crate::protocol::dispatch::observer::CanObserver;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;
use crate::protocol::transport::traits::frame_transport::FrameTransport;

use self::nmt::{NmtCommand, NmtState};
use self::pdo::PDO_ID_RANGE;
use self::sdo::{SdoDirection, SdoFrame};

pub mod nmt;
pub mod pdo;
pub mod sdo;


//==================================================================================FUNCTION_CODES
pub const NMT_ID: u16 = 0x000;
pub const TPDO1_BASE: u16 = 0x180;
pub const RPDO1_BASE: u16 = 0x200;
pub const SDO_RESPONSE_BASE: u16 = 0x580;
pub const SDO_REQUEST_BASE: u16 = 0x600;
pub const HEARTBEAT_BASE: u16 = 0x700;

/// NMT target addressing every node.
pub const NMT_ALL_NODES: u8 = 0;

//==================================================================================CLASSIFICATION
/// How a frame relates to a CANopen observer's node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CobKind {
    /// PDO of the node (`0x180..=0x57F`, node bits equal).
    Pdo,
    /// `0x580 + node`.
    SdoResponse,
    /// `0x600 + node`.
    SdoRequest,
    /// Anything else, including other nodes' traffic.
    Other,
}

impl CobKind {
    pub fn classify(id: &CanId, node_id: u8) -> Self {
        let (Some(function), Some(node)) = (id.function_code(), id.node_id()) else {
            return CobKind::Other;
        };
        if node != node_id & 0x7F {
            return CobKind::Other;
        }
        match function {
            SDO_RESPONSE_BASE => CobKind::SdoResponse,
            SDO_REQUEST_BASE => CobKind::SdoRequest,
            _ if PDO_ID_RANGE.contains(&(id.raw() as u16)) => CobKind::Pdo,
            _ => CobKind::Other,
        }
    }
}

/// Call the handler matching the frame: typed handlers for a CANopen
/// observer's PDO/SDO traffic, the raw handler for everything else
/// (undecodable SDO payloads included).
pub(crate) fn deliver(observer: &mut dyn CanObserver, frame: &CanFrame) {
    if !observer.is_canopen() {
        observer.handle_can_frame(frame);
        return;
    }
    match CobKind::classify(&frame.id, observer.node_id()) {
        CobKind::Pdo => observer.handle_pdo_frame(frame),
        CobKind::SdoResponse | CobKind::SdoRequest => match SdoFrame::decode(frame) {
            Ok((SdoDirection::Response, sdo)) => observer.handle_sdo_response(&sdo),
            Ok((SdoDirection::Request, sdo)) => observer.handle_sdo_request(&sdo),
            Err(_) => observer.handle_can_frame(frame),
        },
        CobKind::Other => observer.handle_can_frame(frame),
    }
}

//==================================================================================BUS_HELPERS
impl<M, T, const OBSERVERS: usize, const MAILBOXES: usize> CanHandler<'_, M, T, OBSERVERS, MAILBOXES>
where
    M: RawMutex,
    T: FrameTransport,
{
    /// Node ID this VCU uses for its own PDOs and heartbeat.
    pub fn master_id(&self) -> u8 {
        self.state().master_id
    }

    pub fn set_master_id(&self, id: u8) {
        self.update_state(|state| state.master_id = id & 0x7F);
    }

    pub fn heartbeat_state(&self) -> NmtState {
        self.state().heartbeat
    }

    pub fn set_heartbeat_state(&self, state: NmtState) {
        self.update_state(|bus| bus.heartbeat = state);
    }

    //==================================================================================NMT
    /// Send `[command, node]` on the NMT identifier. `node` 0 addresses every node.
    pub fn send_nmt(&self, command: NmtCommand, node: u8) -> Result<(), SendError<T::Error>> {
        let mut frame = CanFrame::prepare_output(CanId::cob(NMT_ID, 0));
        frame.data[0] = command as u8;
        frame.data[1] = node & 0x7F;
        frame.len = 2;
        self.can_io(&frame)
    }

    pub fn send_node_start(&self, node: u8) -> Result<(), SendError<T::Error>> {
        self.send_nmt(NmtCommand::Start, node)
    }

    pub fn send_node_preop(&self, node: u8) -> Result<(), SendError<T::Error>> {
        self.send_nmt(NmtCommand::PreOperational, node)
    }

    pub fn send_node_reset(&self, node: u8) -> Result<(), SendError<T::Error>> {
        self.send_nmt(NmtCommand::Reset, node)
    }

    pub fn send_node_stop(&self, node: u8) -> Result<(), SendError<T::Error>> {
        self.send_nmt(NmtCommand::Stop, node)
    }

    pub fn send_node_reset_comm(&self, node: u8) -> Result<(), SendError<T::Error>> {
        self.send_nmt(NmtCommand::ResetCommunication, node)
    }

    /// One-byte heartbeat with the current state, from the master ID.
    pub fn send_heartbeat(&self) -> Result<(), SendError<T::Error>> {
        let state = self.state();
        let mut frame = CanFrame::prepare_output(CanId::cob(HEARTBEAT_BASE, state.master_id));
        frame.data[0] = state.heartbeat as u8;
        frame.len = 1;
        self.can_io(&frame)
    }

    //==================================================================================PDO
    /// Transmit PDO `pdo_index` (1 to 4) of the master node, `data` verbatim.
    pub fn send_pdo_message(&self, pdo_index: u8, data: &[u8]) -> Result<(), CanOpenError<T::Error>> {
        let Some(id) = pdo::tpdo_id(pdo_index, self.master_id()) else {
            return Err(self.reject(CanOpenError::InvalidPdoIndex { index: pdo_index }));
        };
        self.send_pdo(id, data)
    }

    /// PDO on an explicit identifier in `0x180..=0x57F`.
    pub fn send_pdo_raw(&self, cob_id: u16, data: &[u8]) -> Result<(), CanOpenError<T::Error>> {
        if !PDO_ID_RANGE.contains(&cob_id) {
            return Err(self.reject(CanOpenError::InvalidPdoId { id: cob_id }));
        }
        self.send_pdo(CanId::standard_masked(cob_id), data)
    }

    fn send_pdo(&self, id: CanId, data: &[u8]) -> Result<(), CanOpenError<T::Error>> {
        let Some(frame) = CanFrame::new(id, data) else {
            return Err(self.reject(CanOpenError::PayloadTooLong { len: data.len() }));
        };
        self.can_io(&frame).map_err(CanOpenError::Send)
    }

    //==================================================================================SDO
    /// Client request to `frame.node_id` (`0x600 + node`).
    pub fn send_sdo_request(&self, frame: &SdoFrame) -> Result<(), CanOpenError<T::Error>> {
        self.send_sdo(frame, SdoDirection::Request)
    }

    /// Server response from `frame.node_id` (`0x580 + node`).
    pub fn send_sdo_response(&self, frame: &SdoFrame) -> Result<(), CanOpenError<T::Error>> {
        self.send_sdo(frame, SdoDirection::Response)
    }

    fn send_sdo(
        &self,
        frame: &SdoFrame,
        direction: SdoDirection,
    ) -> Result<(), CanOpenError<T::Error>> {
        let encoded = frame
            .encode(direction)
            .map_err(|err| self.reject(CanOpenError::Sdo(err)))?;
        self.can_io(&encoded).map_err(CanOpenError::Send)
    }

    /// Log and report a payload refused before transmission.
    fn reject(&self, err: CanOpenError<T::Error>) -> CanOpenError<T::Error> {
        #[cfg(feature = "defmt")]
        defmt::warn!("{}: CANopen payload rejected", self.node());
        self.report(DiagnosticEvent::MalformedPayload { bus: self.node() });
        err
    }
}

//! Network management: commands the master sends on identifier `0x000`, and
//! the node states carried by heartbeats.
use crate::protocol::canopen::HEARTBEAT_BASE;
use crate::protocol::transport::can_frame::CanFrame;

/// NMT command specifier (byte 0 of an NMT frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NmtCommand {
    Start = 0x01,
    Stop = 0x02,
    PreOperational = 0x80,
    Reset = 0x81,
    ResetCommunication = 0x82,
}

/// Node state, as carried in byte 0 of a heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NmtState {
    BootUp = 0x00,
    Stopped = 0x04,
    Operational = 0x05,
    PreOperational = 0x7F,
}

impl NmtState {
    /// Decode a heartbeat state byte. The toggle bit (bit 7) is ignored.
    pub const fn from_heartbeat(byte: u8) -> Option<Self> {
        match byte & 0x7F {
            0x00 => Some(NmtState::BootUp),
            0x04 => Some(NmtState::Stopped),
            0x05 => Some(NmtState::Operational),
            0x7F => Some(NmtState::PreOperational),
            _ => None,
        }
    }
}

/// Sender node and state of a heartbeat frame; `None` for anything else.
pub fn parse_heartbeat(frame: &CanFrame) -> Option<(u8, NmtState)> {
    if frame.id.function_code() != Some(HEARTBEAT_BASE) || frame.len < 1 {
        return None;
    }
    let node = frame.id.node_id()?;
    Some((node, NmtState::from_heartbeat(frame.data[0])?))
}

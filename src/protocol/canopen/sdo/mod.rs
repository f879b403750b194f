//! Expedited SDO frames: encoding and decoding of the eight-byte layout
//!
//! ```text
//! byte 0     command | expedited size bits
//! byte 1..2  object index, little endian
//! byte 3     sub-index
//! byte 4..7  data, zero padded
//! ```
//!
//! Segmented transfers are not supported; payloads stop at four bytes.
use crate::error::SdoError;
use crate::protocol::canopen::{SDO_REQUEST_BASE, SDO_RESPONSE_BASE};
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;

/// Largest expedited payload.
pub const SDO_MAX_DATA: usize = 4;

const COMMAND_MASK: u8 = 0xE0;
const EXPEDITED: u8 = 0x02;
const SIZE_INDICATED: u8 = 0x01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SdoCommand {
    Write = 0x20,
    Read = 0x40,
    WriteAck = 0x60,
}

impl SdoCommand {
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte & COMMAND_MASK {
            0x20 => Some(SdoCommand::Write),
            0x40 => Some(SdoCommand::Read),
            0x60 => Some(SdoCommand::WriteAck),
            _ => None,
        }
    }
}

/// Which way the frame travels: client to server (`0x600 + node`) or back (`0x580 + node`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SdoDirection {
    Request,
    Response,
}

impl SdoDirection {
    const fn base(self) -> u16 {
        match self {
            SdoDirection::Request => SDO_REQUEST_BASE,
            SdoDirection::Response => SDO_RESPONSE_BASE,
        }
    }
}

/// Decoded expedited SDO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SdoFrame {
    pub node_id: u8,
    pub command: SdoCommand,
    pub index: u16,
    pub sub_index: u8,
    /// Valid bytes in `data`, 0 to 4.
    pub data_length: u8,
    pub data: [u8; 4],
}

impl SdoFrame {
    /// Write `data` to `index:sub_index` of `node_id`.
    pub fn write(node_id: u8, index: u16, sub_index: u8, data: &[u8]) -> Result<Self, SdoError> {
        if data.len() > SDO_MAX_DATA {
            return Err(SdoError::DataTooLong { len: data.len() });
        }
        let mut buffer = [0u8; 4];
        buffer[..data.len()].copy_from_slice(data);
        Ok(Self {
            node_id: node_id & 0x7F,
            command: SdoCommand::Write,
            index,
            sub_index,
            data_length: data.len() as u8,
            data: buffer,
        })
    }

    /// Read request for `index:sub_index` of `node_id`.
    pub const fn read(node_id: u8, index: u16, sub_index: u8) -> Self {
        Self {
            node_id: node_id & 0x7F,
            command: SdoCommand::Read,
            index,
            sub_index,
            data_length: 0,
            data: [0; 4],
        }
    }

    /// Acknowledge a write to `index:sub_index`.
    pub const fn write_ack(node_id: u8, index: u16, sub_index: u8) -> Self {
        Self {
            node_id: node_id & 0x7F,
            command: SdoCommand::WriteAck,
            index,
            sub_index,
            data_length: 0,
            data: [0; 4],
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..(self.data_length as usize).min(SDO_MAX_DATA)]
    }

    /// Build the eight-byte frame, addressed according to `direction`.
    pub fn encode(&self, direction: SdoDirection) -> Result<CanFrame, SdoError> {
        let len = self.data_length as usize;
        if len > SDO_MAX_DATA {
            return Err(SdoError::DataTooLong { len });
        }

        let mut frame = CanFrame::prepare_output(CanId::cob(direction.base(), self.node_id));
        frame.data[0] = self.command as u8;
        if len > 0 {
            // n = 4 - len unused bytes, expedited, size indicated.
            frame.data[0] |= 0x0F - 4 * (len as u8 - 1);
        }
        frame.data[1..3].copy_from_slice(&self.index.to_le_bytes());
        frame.data[3] = self.sub_index;
        frame.data[4..4 + len].copy_from_slice(&self.data[..len]);
        Ok(frame)
    }

    /// Parse a received frame. The direction and node come from the identifier.
    pub fn decode(frame: &CanFrame) -> Result<(SdoDirection, Self), SdoError> {
        let direction = match frame.id.function_code() {
            Some(SDO_REQUEST_BASE) => SdoDirection::Request,
            Some(SDO_RESPONSE_BASE) => SdoDirection::Response,
            _ => return Err(SdoError::NotSdo { id: frame.id.raw() }),
        };
        if frame.len != CanFrame::MAX_DATA {
            return Err(SdoError::InvalidLength { len: frame.len });
        }

        let b0 = frame.data[0];
        let command = SdoCommand::from_byte(b0).ok_or(SdoError::UnknownCommand { byte: b0 })?;
        let data_length = if b0 & (EXPEDITED | SIZE_INDICATED) == EXPEDITED | SIZE_INDICATED {
            4 - ((b0 >> 2) & 0x03)
        } else if b0 & EXPEDITED != 0 {
            4
        } else {
            0
        };

        let mut data = [0u8; 4];
        let len = data_length as usize;
        data[..len].copy_from_slice(&frame.data[4..4 + len]);
        Ok((
            direction,
            Self {
                node_id: frame.id.node_id().unwrap_or_default(),
                command,
                index: u16::from_le_bytes([frame.data[1], frame.data[2]]),
                sub_index: frame.data[3],
                data_length,
                data,
            },
        ))
    }
}

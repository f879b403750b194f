//! CAN identifiers: 11-bit standard and 29-bit extended, plus the CANopen
//! function-code / node-ID split of standard identifiers.
use crate::error::CanIdError;
use embedded_can::{ExtendedId, Id, StandardId};

//==================================================================================CAN_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Range-checked CAN identifier. The extended flag travels with the value so
/// filters can match on both.
pub struct CanId {
    raw: u32,
    extended: bool,
}

impl CanId {
    /// Largest standard identifier.
    pub const MAX_STANDARD: u32 = 0x7FF;
    /// Largest extended identifier.
    pub const MAX_EXTENDED: u32 = 0x1FFF_FFFF;

    /// Builds an 11-bit identifier.
    pub fn standard(id: u16) -> Result<Self, CanIdError> {
        Self::new(id as u32, false)
    }

    /// Builds a 29-bit identifier.
    pub fn extended(id: u32) -> Result<Self, CanIdError> {
        Self::new(id, true)
    }

    /// Builds an identifier of either format.
    pub fn new(id: u32, extended: bool) -> Result<Self, CanIdError> {
        match extended {
            false if id > Self::MAX_STANDARD => Err(CanIdError::StandardOutOfRange { id }),
            true if id > Self::MAX_EXTENDED => Err(CanIdError::ExtendedOutOfRange { id }),
            _ => Ok(Self { raw: id, extended }),
        }
    }

    /// Standard identifier from the low eleven bits of `id`.
    pub const fn standard_masked(id: u16) -> Self {
        Self {
            raw: (id & 0x7FF) as u32,
            extended: false,
        }
    }

    /// CANopen communication object: `function_code + node_id`.
    /// The node ID is truncated to its seven meaningful bits.
    pub const fn cob(function_code: u16, node_id: u8) -> Self {
        Self {
            raw: ((function_code as u32) & 0x780) | ((node_id & 0x7F) as u32),
            extended: false,
        }
    }

    /// Numeric identifier value.
    pub const fn raw(&self) -> u32 {
        self.raw
    }

    /// `true` for 29-bit identifiers.
    pub const fn is_extended(&self) -> bool {
        self.extended
    }

    /// CANopen function code (upper four bits of a standard identifier).
    pub const fn function_code(&self) -> Option<u16> {
        if self.extended {
            None
        } else {
            Some((self.raw & 0x780) as u16)
        }
    }

    /// CANopen node ID (lower seven bits of a standard identifier).
    pub const fn node_id(&self) -> Option<u8> {
        if self.extended {
            None
        } else {
            Some((self.raw & 0x7F) as u8)
        }
    }
}

//==================================================================================EMBEDDED_CAN
impl From<CanId> for Id {
    fn from(id: CanId) -> Self {
        // SAFETY: `CanId` constructors reject values outside the format's range.
        unsafe {
            if id.extended {
                Id::Extended(ExtendedId::new_unchecked(id.raw))
            } else {
                Id::Standard(StandardId::new_unchecked(id.raw as u16))
            }
        }
    }
}

impl From<Id> for CanId {
    fn from(id: Id) -> Self {
        match id {
            Id::Standard(id) => CanId {
                raw: id.as_raw() as u32,
                extended: false,
            },
            Id::Extended(id) => CanId {
                raw: id.as_raw(),
                extended: true,
            },
        }
    }
}

//! PDO identifiers of the pre-defined connection set.
use core::ops::RangeInclusive;

use crate::protocol::canopen::{RPDO1_BASE, TPDO1_BASE};
use crate::protocol::transport::can_id::CanId;

/// Number of transmit (and receive) PDOs per node.
pub const PDO_COUNT: u8 = 4;

/// Every TPDO and RPDO identifier of every node.
pub const PDO_ID_RANGE: RangeInclusive<u16> = 0x180..=0x57F;

/// Identifier of transmit PDO `index` (1 to 4) of `node_id`.
pub const fn tpdo_id(index: u8, node_id: u8) -> Option<CanId> {
    pdo_id(TPDO1_BASE, index, node_id)
}

/// Identifier of receive PDO `index` (1 to 4) of `node_id`.
pub const fn rpdo_id(index: u8, node_id: u8) -> Option<CanId> {
    pdo_id(RPDO1_BASE, index, node_id)
}

const fn pdo_id(base: u16, index: u8, node_id: u8) -> Option<CanId> {
    if index == 0 || index > PDO_COUNT {
        return None;
    }
    Some(CanId::cob(base + 0x100 * (index as u16 - 1), node_id))
}

/// `true` for standard identifiers inside the PDO band.
pub fn is_pdo_id(id: &CanId) -> bool {
    !id.is_extended() && PDO_ID_RANGE.contains(&(id.raw() as u16))
}

//! `vcu-can` library: the CAN backbone of a vehicle control unit in a
//! `no_std` environment. Several logical buses are multiplexed among device
//! drivers through fixed-capacity observer registries; on top sit a
//! CANopen-derived layer (NMT, heartbeat, PDO, expedited SDO) and ISO-TP
//! segmentation for payloads larger than one frame.
#![no_std]
//==================================================================================
/// Bus and I/O descriptors shared by the build script and the runtime.
pub mod core;
/// Constants generated from the bus manifest.
pub mod config;
/// Registration, transmission, CANopen and ISO-TP errors.
pub mod error;
/// Diagnostics boundary.
pub mod infra;
/// Dispatch core, CANopen layer, I/O broadcasts and CAN transport.
pub mod protocol;
//==================================================================================
#[cfg(test)]
pub(crate) mod testing;

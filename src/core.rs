//! Defines the "data contract" between `build.rs` (the scribe) and the
//! runtime dispatch core (the consumer).
//!
//! `build.rs` reads the bus manifest and emits static descriptors built from
//! these types. The `config` module includes the generated file.

// Types in this module are primarily used by generated code.
#![allow(dead_code)]

/// Number of logical CAN buses handled by a vehicle control unit.
pub const BUS_COUNT: usize = 4;

/// Logical CAN bus identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusNode {
    /// EV bus: motor controller, charger, BMS.
    Ev,
    /// High-speed car bus (the one carrying the ECU).
    Car,
    /// Secondary car bus. Shares its controller with `SingleWire`.
    Car2,
    /// Single-wire CAN. Shares its controller with `Car2`.
    SingleWire,
}

impl BusNode {
    /// All buses, in manifest order.
    pub const ALL: [BusNode; BUS_COUNT] = [
        BusNode::Ev,
        BusNode::Car,
        BusNode::Car2,
        BusNode::SingleWire,
    ];

    /// Position inside [`BusNode::ALL`] and the generated profile table.
    pub const fn index(self) -> usize {
        match self {
            BusNode::Ev => 0,
            BusNode::Car => 1,
            BusNode::Car2 => 2,
            BusNode::SingleWire => 3,
        }
    }

    /// Manifest key of the bus.
    pub const fn name(self) -> &'static str {
        match self {
            BusNode::Ev => "ev",
            BusNode::Car => "car",
            BusNode::Car2 => "car2",
            BusNode::SingleWire => "single_wire",
        }
    }

    /// Resolve a manifest key.
    pub fn from_name(name: &str) -> Option<BusNode> {
        BusNode::ALL.into_iter().find(|bus| bus.name() == name)
    }

    /// Bus sharing the same physical controller, if any.
    pub const fn controller_sibling(self) -> Option<BusNode> {
        match self {
            BusNode::Car2 => Some(BusNode::SingleWire),
            BusNode::SingleWire => Some(BusNode::Car2),
            _ => None,
        }
    }
}

/// Static per-bus configuration emitted by the build script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusProfile {
    /// 1. Bus identity.
    pub node: BusNode,
    /// 2. Default bit-rate in kbit/s. `0` leaves the bus disabled.
    pub speed_kbps: u32,
}

/// Channels of the simple I/O broadcast sub-protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoChannel {
    /// Switch state.
    Switch,
    /// Digital output states.
    Outputs,
    /// Analog input readings.
    AnalogInputs,
    /// Digital input states.
    DigitalInputs,
}

impl IoChannel {
    /// All channels, in manifest order.
    pub const ALL: [IoChannel; 4] = [
        IoChannel::Switch,
        IoChannel::Outputs,
        IoChannel::AnalogInputs,
        IoChannel::DigitalInputs,
    ];

    /// Manifest key of the channel.
    pub const fn name(self) -> &'static str {
        match self {
            IoChannel::Switch => "switch",
            IoChannel::Outputs => "outputs",
            IoChannel::AnalogInputs => "analog_inputs",
            IoChannel::DigitalInputs => "digital_inputs",
        }
    }

    /// Resolve a manifest key.
    pub fn from_name(name: &str) -> Option<IoChannel> {
        IoChannel::ALL.into_iter().find(|channel| channel.name() == name)
    }
}

/// Identifier assigned to an I/O broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoBinding {
    pub channel: IoChannel,
    /// Standard (11-bit) identifier.
    pub id: u16,
}

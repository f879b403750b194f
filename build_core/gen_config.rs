//! Validate the bus manifest and emit the Rust configuration constants.
use super::conf::*;
use super::domain::*;
use super::errors::*;
use crate::core::{BusNode, IoChannel, BUS_COUNT};

use std::fmt::Write;

/// Validate `manifest` and return the source of `generated_bus_config.rs`.
pub(crate) fn run_config_gen(manifest: &Manifest) -> Result<String, BuildError> {
    check_capacity("observers", manifest.observers, MAX_OBSERVERS)?;
    check_capacity("mailboxes", manifest.mailboxes, MAX_MAILBOXES)?;

    let speeds = collect_speeds(&manifest.buses)?;
    let io_ids = collect_io_ids(&manifest.io_broadcast)?;

    if manifest.mailboxes < manifest.observers {
        println!(
            "cargo:warning=Only {} mailboxes for {} observer slots: attach() will run out of mailboxes first",
            manifest.mailboxes, manifest.observers
        );
    }

    let mut code = String::new();
    writeln!(code, "// @generated by build.rs from the bus manifest. Do not edit.")?;
    writeln!(code)?;
    writeln!(code, "/// Observer registry capacity of every bus.")?;
    writeln!(
        code,
        "pub const CFG_CAN_NUM_OBSERVERS: usize = {};",
        manifest.observers
    )?;
    writeln!(code, "/// Hardware mailboxes available to filters on every bus.")?;
    writeln!(
        code,
        "pub const CFG_CAN_NUM_MAILBOXES: usize = {};",
        manifest.mailboxes
    )?;
    writeln!(code)?;
    writeln!(code, "/// Default bit-rate of every logical bus, in `BusNode::ALL` order.")?;
    writeln!(code, "pub const BUS_PROFILES: [BusProfile; BUS_COUNT] = [")?;
    for (node, speed) in BusNode::ALL.iter().zip(speeds.iter()) {
        writeln!(
            code,
            "    BusProfile {{ node: BusNode::{:?}, speed_kbps: {} }},",
            node, speed
        )?;
    }
    writeln!(code, "];")?;
    writeln!(code)?;
    writeln!(code, "/// Identifiers of the I/O broadcast sub-protocol.")?;
    writeln!(code, "pub const IO_BINDINGS: [IoBinding; {}] = [", io_ids.len())?;
    for (channel, id) in IoChannel::ALL.iter().zip(io_ids.iter()) {
        writeln!(
            code,
            "    IoBinding {{ channel: IoChannel::{:?}, id: {:#05X} }},",
            channel, id
        )?;
    }
    writeln!(code, "];")?;

    Ok(code)
}

fn check_capacity(field: &'static str, value: usize, max: usize) -> Result<(), BuildError> {
    if value == 0 || value > max {
        return Err(BuildError::InvalidCapacity { field, value, max });
    }
    Ok(())
}

/// Speeds indexed like `BusNode::ALL`. Every bus must be listed exactly once.
fn collect_speeds(entries: &[BusEntry]) -> Result<[u32; BUS_COUNT], BuildError> {
    let mut speeds: [Option<u32>; BUS_COUNT] = [None; BUS_COUNT];

    for entry in entries {
        let node = BusNode::from_name(&entry.node).ok_or_else(|| BuildError::UnknownBus {
            name: entry.node.clone(),
        })?;
        if entry.speed_kbps > MAX_SPEED_KBPS {
            return Err(BuildError::InvalidSpeed {
                name: entry.node.clone(),
                speed: entry.speed_kbps,
            });
        }
        let slot = &mut speeds[node.index()];
        if slot.is_some() {
            return Err(BuildError::BusCoverage { name: node.name() });
        }
        *slot = Some(entry.speed_kbps);
    }

    let mut resolved = [0u32; BUS_COUNT];
    for (node, (speed, out)) in BusNode::ALL
        .iter()
        .zip(speeds.iter().zip(resolved.iter_mut()))
    {
        *out = speed.ok_or(BuildError::BusCoverage { name: node.name() })?;
    }
    Ok(resolved)
}

/// Identifiers indexed like `IoChannel::ALL`.
fn collect_io_ids(entries: &[IoEntry]) -> Result<Vec<u16>, BuildError> {
    let mut ids: Vec<Option<u16>> = vec![None; IoChannel::ALL.len()];

    for entry in entries {
        let channel =
            IoChannel::from_name(&entry.channel).ok_or_else(|| BuildError::UnknownIoChannel {
                name: entry.channel.clone(),
            })?;
        let id = entry
            .id
            .value()
            .filter(|value| *value <= MAX_STANDARD_ID as u32)
            .ok_or_else(|| BuildError::InvalidIdentifier {
                channel: entry.channel.clone(),
                value: format!("{:?}", entry.id),
            })?;
        let position = IoChannel::ALL
            .iter()
            .position(|candidate| *candidate == channel)
            .ok_or(BuildError::IoCoverage {
                name: channel.name(),
            })?;
        if ids[position].is_some() {
            return Err(BuildError::IoCoverage {
                name: channel.name(),
            });
        }
        ids[position] = Some(id as u16);
    }

    IoChannel::ALL
        .iter()
        .zip(ids)
        .map(|(channel, id)| {
            id.ok_or(BuildError::IoCoverage {
                name: channel.name(),
            })
        })
        .collect()
}

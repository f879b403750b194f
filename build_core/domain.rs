use serde::Deserialize;

//==================================================================================MANIFEST
// Structures to deserialize `bus_manifest.json`.
#[derive(Debug, Deserialize)]
/// Firmware-level CAN configuration.
pub(crate) struct Manifest {
    /// Observer registry capacity of every bus (`CFG_CAN_NUM_OBSERVERS`).
    pub(crate) observers: usize,
    /// Hardware mailboxes available to filters on every bus.
    pub(crate) mailboxes: usize,
    pub(crate) buses: Vec<BusEntry>,
    pub(crate) io_broadcast: Vec<IoEntry>,
}

#[derive(Debug, Deserialize)]
/// Default bit-rate of one logical bus.
pub(crate) struct BusEntry {
    pub(crate) node: String,
    pub(crate) speed_kbps: u32,
}

#[derive(Debug, Deserialize)]
/// Identifier of one I/O broadcast channel. Hexadecimal strings ("0x606") are accepted.
pub(crate) struct IoEntry {
    pub(crate) channel: String,
    pub(crate) id: IdLiteral,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
/// JSON has no hexadecimal literal, so identifiers may be written either way.
pub(crate) enum IdLiteral {
    Number(u32),
    Text(String),
}

impl IdLiteral {
    /// Numeric value of the literal, `None` when the text is not a number.
    pub(crate) fn value(&self) -> Option<u32> {
        match self {
            IdLiteral::Number(value) => Some(*value),
            IdLiteral::Text(text) => {
                let text = text.trim();
                match text
                    .strip_prefix("0x")
                    .or_else(|| text.strip_prefix("0X"))
                {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => text.parse().ok(),
                }
            }
        }
    }
}

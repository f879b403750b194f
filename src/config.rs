//! Build-time configuration. `generated_bus_config.rs` is produced by `build.rs`
//! from `build_core/var/bus_manifest.json` (or the file named by
//! `VCU_CAN_MANIFEST_PATH`).
use crate::core::{BusNode, BusProfile, IoBinding, IoChannel, BUS_COUNT};

include!(concat!(env!("OUT_DIR"), "/generated_bus_config.rs"));

impl BusNode {
    /// Bit-rate (kbit/s) the bus starts with. `0` means disabled.
    pub const fn default_speed_kbps(self) -> u32 {
        BUS_PROFILES[self.index()].speed_kbps
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BusNode {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for IoChannel {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.name())
    }
}

impl IoChannel {
    /// Standard identifier assigned to the channel by the manifest.
    pub fn id(self) -> u16 {
        IO_BINDINGS
            .iter()
            .find(|binding| binding.channel == self)
            .map(|binding| binding.id)
            .unwrap_or_default()
    }

    /// Channel broadcast on `id`, if any.
    pub fn from_id(id: u16) -> Option<IoChannel> {
        IO_BINDINGS
            .iter()
            .find(|binding| binding.id == id)
            .map(|binding| binding.channel)
    }
}

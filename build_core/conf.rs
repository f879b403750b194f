//! Paths and limits used during build-time code generation.
//==================================================================================CONF
/// Default bus manifest shipped with the crate.
pub(crate) const BUS_MANIFEST_PATH: &str = "build_core/var/bus_manifest.json";
/// Environment variable pointing to a firmware-specific manifest.
pub(crate) const BUS_MANIFEST_ENV: &str = "VCU_CAN_MANIFEST_PATH";
/// Generated configuration file name (written to `OUT_DIR`).
pub(crate) const OUT_DIR_CONFIG_FILE_NAME: &str = "generated_bus_config.rs";
//==========================================LIMITS
/// Mailbox indices are stored on a `u8`.
pub(crate) const MAX_MAILBOXES: usize = 255;
/// Observer slots are scanned linearly at every received frame; keep it small.
pub(crate) const MAX_OBSERVERS: usize = 64;
/// Fastest classic CAN bit-rate (kbit/s).
pub(crate) const MAX_SPEED_KBPS: u32 = 1000;
/// Largest standard (11-bit) identifier.
pub(crate) const MAX_STANDARD_ID: u16 = 0x7FF;

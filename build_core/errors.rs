//! Error set that can occur while generating code during the build step.
use std::env::VarError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the build script (JSON parsing, validation, code generation).
pub(crate) enum BuildError {
    /// Failed to read the `OUT_DIR` environment variable.
    #[error("[MESSAGE]:OUT_DIR error. [ERROR]:{source}")]
    OutDirErr {
        #[source]
        source: VarError,
    },

    /// Failure while parsing the manifest.
    #[error("[MESSAGE]:Invalid JSON format [Error]:{0:?}")]
    ParseJson(#[from] serde_json::Error),

    /// Unable to read a file from disk.
    #[error("[MESSAGE]:Failed to read file [PATH]:{path} [ERROR]:{source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the generated code to disk.
    #[error("[MESSAGE]:Failed to write file [PATH]:{path} [ERROR]:{source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Formatting error while writing generated code.
    #[error("[MESSAGE]:Failed to display writeln! macro [ERROR]:{source}")]
    WritelnErr {
        #[from]
        source: std::fmt::Error,
    },

    /// Capacity outside the supported range.
    #[error("[MESSAGE]:Invalid capacity [FIELD]:{field} [VALUE]:{value} [MAX]:{max}")]
    InvalidCapacity {
        field: &'static str,
        value: usize,
        max: usize,
    },

    /// Unknown bus key in the manifest.
    #[error("[MESSAGE]:Unknown bus [NAME]:{name}")]
    UnknownBus { name: String },

    /// Bus listed twice or missing from the manifest.
    #[error("[MESSAGE]:Every bus must appear exactly once [NAME]:{name}")]
    BusCoverage { name: &'static str },

    /// Bit-rate above the classic CAN maximum.
    #[error("[MESSAGE]:Invalid bus speed [NAME]:{name} [KBPS]:{speed}")]
    InvalidSpeed { name: String, speed: u32 },

    /// Unknown I/O broadcast channel key.
    #[error("[MESSAGE]:Unknown I/O channel [NAME]:{name}")]
    UnknownIoChannel { name: String },

    /// Channel listed twice or missing from the manifest.
    #[error("[MESSAGE]:Every I/O channel must appear exactly once [NAME]:{name}")]
    IoCoverage { name: &'static str },

    /// Identifier that does not fit in 11 bits or cannot be parsed.
    #[error("[MESSAGE]:Invalid standard identifier [CHANNEL]:{channel} [VALUE]:{value}")]
    InvalidIdentifier { channel: String, value: String },
}

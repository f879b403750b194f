//! Cargo build script: generates the bus configuration constants.

// Re-export the core module from src/core.rs so build_core can reuse it
#[path = "src/core.rs"]
mod core;

mod build_core;
use crate::build_core::{
    conf::*, domain::Manifest, errors::BuildError, gen_config::run_config_gen,
};

use std::fs;
use std::path::PathBuf;

// The firmware describes its CAN wiring in a JSON manifest: registry and mailbox
// capacities, default bit-rate per logical bus, and the identifiers of the I/O
// broadcast sub-protocol. This script validates the manifest and turns it into
// `const` items so the runtime stays allocation-free and fully static.

//==================================================================================MAIN
fn main() -> Result<(), BuildError> {
    // Tell Cargo to rerun this script whenever one of these inputs changes.
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/core.rs");
    println!("cargo:rerun-if-changed={}", BUS_MANIFEST_PATH);
    println!("cargo:rerun-if-env-changed={}", BUS_MANIFEST_ENV);

    // 1. Locate the manifest.
    // Priority order:
    //   1. VCU_CAN_MANIFEST_PATH environment variable (absolute or relative path)
    //   2. Default manifest shipped with the crate
    let default_manifest_path = PathBuf::from(BUS_MANIFEST_PATH);

    let manifest_path = match std::env::var(BUS_MANIFEST_ENV).ok().map(PathBuf::from) {
        Some(path) if path.exists() => {
            println!("cargo:warning=Using custom bus manifest from {:?}", path);
            println!("cargo:rerun-if-changed={}", path.display());
            path
        }
        Some(path) => {
            println!(
                "cargo:warning=Custom manifest path specified but file not found: {:?}",
                path
            );
            println!("cargo:warning=Falling back to the default bus manifest");
            default_manifest_path
        }
        None => default_manifest_path,
    };

    let manifest_string = fs::read_to_string(&manifest_path).map_err(|e| BuildError::ReadFile {
        path: manifest_path.clone(),
        source: e,
    })?;
    let manifest: Manifest = serde_json::from_str(&manifest_string)?;

    // 2. Validate and generate.
    let config_code = run_config_gen(&manifest)?;

    // 3. Write the generated code into `OUT_DIR`; `src/config.rs` includes it.
    let out_dir_str = std::env::var("OUT_DIR").map_err(|e| BuildError::OutDirErr { source: e })?;
    let config_file_path = PathBuf::from(out_dir_str).join(OUT_DIR_CONFIG_FILE_NAME);

    fs::write(&config_file_path, &config_code).map_err(|e| BuildError::WriteFile {
        path: config_file_path,
        source: e,
    })?;

    Ok(())
}

//! Infrastructure shared by the protocol layers.
pub mod diagnostics;

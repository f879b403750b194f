//! CAN transport layer: frame and identifier representations, ISO-TP
//! segmentation, and the traits the bus and the hardware meet at.
//!
//! ## Timing
//!
//! Nothing here waits on the bus. The only delays are the ones ISO-TP flow
//! control asks for, and they go through
//! [`BusTimer`](traits::bus_timer::BusTimer) so the same code runs on an
//! embassy executor and under tokio in tests.
pub mod can_frame;
pub mod can_id;
pub mod isotp;
pub mod traits;

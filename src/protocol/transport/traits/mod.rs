//! Abstraction traits used by the transport layer (frame transport, frame
//! sender, timer, and the ISO-TP sending extension).
pub mod bus_timer;
pub mod frame_sender;
pub mod frame_transport;
pub mod isotp_sender;

//! Protocol stack of the VCU buses: frame dispatch, the CANopen layer,
//! I/O broadcasts and the CAN transport underneath.
pub mod canopen;
pub mod dispatch;
pub mod io_broadcast;
pub mod transport;

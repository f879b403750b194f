//! Asynchronous timer abstraction providing the delays required by paced
//! ISO-TP transmission (STmin, flow-control timeout).
use embassy_time::Duration;

/// Timer trait abstraction; must remain thread-safe when applicable.
pub trait BusTimer {
    /// Asynchronously wait for `duration`.
    fn delay<'a>(&'a mut self, duration: Duration) -> impl core::future::Future<Output = ()> + 'a;
}

//! `FrameSender` extension transmitting ISO-TP messages: segments the payload
//! with [`IsoTpBuilder`] and puts the frames on the bus.
//!
//! # Pacing
//!
//! [`IsoTpSender::send_isotp`] sends every frame back to back, which suits
//! receivers that do not answer with flow control (the VCU's own broadcast
//! peers). [`IsoTpSender::send_isotp_paced`] follows the full handshake: after
//! the First frame it waits for a Flow-control frame, then honours its block
//! size and STmin. Flow frames reach it through a [`Signal`], typically fed by
//! a [`FlowControlObserver`](crate::protocol::transport::isotp::flow::FlowControlObserver).
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use futures_util::{
    future::{select, Either},
    pin_mut,
};

use crate::{
    error::IsoTpError,
    protocol::transport::can_id::CanId,
    protocol::transport::isotp::{
        builder::IsoTpBuilder, FlowControl, FlowStatus, FLOW_CONTROL_TIMEOUT_MS,
        MAX_FLOW_WAIT_FRAMES,
    },
    protocol::transport::traits::{bus_timer::BusTimer, frame_sender::FrameSender},
};

/// Trait extending `FrameSender` with ISO-TP transmission.
pub trait IsoTpSender: FrameSender {
    /// Segment `payload` and send every frame without waiting for flow control.
    ///
    /// Returns the number of frames sent; an empty payload sends nothing.
    ///
    /// # Errors
    ///
    /// - [`IsoTpError::PayloadTooLarge`] above 4095 bytes, before anything is sent
    /// - [`IsoTpError::Send`] on the first refused frame; the rest is dropped
    fn send_isotp(&self, id: CanId, payload: &[u8]) -> Result<usize, IsoTpError<Self::Error>>;

    /// Segment `payload` and send it under receiver flow control.
    ///
    /// Stale flow frames still pending on `flow` are discarded before the
    /// First frame goes out.
    ///
    /// # Errors
    ///
    /// On top of the [`send_isotp`](Self::send_isotp) errors:
    /// - [`IsoTpError::FlowTimeout`] when no flow frame arrives within
    ///   [`FLOW_CONTROL_TIMEOUT_MS`], or after too many `Wait` frames
    /// - [`IsoTpError::FlowOverflow`] when the receiver refuses the message
    fn send_isotp_paced<'a, M: RawMutex, T: BusTimer>(
        &'a self,
        id: CanId,
        payload: &'a [u8],
        flow: &'a Signal<M, FlowControl>,
        timer: &'a mut T,
    ) -> impl core::future::Future<Output = Result<usize, IsoTpError<Self::Error>>> + 'a;
}

impl<S: FrameSender + ?Sized> IsoTpSender for S {
    fn send_isotp(&self, id: CanId, payload: &[u8]) -> Result<usize, IsoTpError<Self::Error>> {
        let builder = IsoTpBuilder::new(id, payload)
            .map_err(|_| IsoTpError::PayloadTooLarge { len: payload.len() })?;

        let mut sent = 0;
        for frame in builder.build() {
            self.send_frame(&frame).map_err(IsoTpError::Send)?;
            sent += 1;
        }
        Ok(sent)
    }

    fn send_isotp_paced<'a, M: RawMutex, T: BusTimer>(
        &'a self,
        id: CanId,
        payload: &'a [u8],
        flow: &'a Signal<M, FlowControl>,
        timer: &'a mut T,
    ) -> impl core::future::Future<Output = Result<usize, IsoTpError<Self::Error>>> + 'a {
        async move {
            let builder = IsoTpBuilder::new(id, payload)
                .map_err(|_| IsoTpError::PayloadTooLarge { len: payload.len() })?;
            if !builder.is_segmented() {
                return self.send_isotp(id, payload);
            }

            let mut frames = builder.build();
            let Some(first) = frames.next() else {
                return Ok(0);
            };

            flow.reset();
            self.send_frame(&first).map_err(IsoTpError::Send)?;
            let mut sent = 1;

            let mut control = wait_for_flow::<_, _, Self::Error>(flow, timer).await?;
            // Frames sent since the last flow frame. Never wraps: with block
            // size 0 a single block may hold the whole message.
            let mut in_block: usize = 0;

            for frame in frames {
                if control.block_size != 0 && in_block == usize::from(control.block_size) {
                    control = wait_for_flow::<_, _, Self::Error>(flow, timer).await?;
                    in_block = 0;
                } else if in_block != 0 {
                    timer.delay(control.separation_time()).await;
                }

                self.send_frame(&frame).map_err(IsoTpError::Send)?;
                sent += 1;
                in_block += 1;
            }

            Ok(sent)
        }
    }
}

/// Wait for a clear-to-send, tolerating a bounded number of `Wait` frames.
async fn wait_for_flow<M: RawMutex, T: BusTimer, E: core::fmt::Debug>(
    flow: &Signal<M, FlowControl>,
    timer: &mut T,
) -> Result<FlowControl, IsoTpError<E>> {
    let mut waits: u8 = 0;
    loop {
        let received = flow.wait();
        let timeout = timer.delay(Duration::from_millis(FLOW_CONTROL_TIMEOUT_MS));
        pin_mut!(received);
        pin_mut!(timeout);

        let control = match select(received, timeout).await {
            Either::Left((control, _)) => control,
            Either::Right(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("ISO-TP: no flow control within {} ms", FLOW_CONTROL_TIMEOUT_MS);
                return Err(IsoTpError::FlowTimeout);
            }
        };

        match control.status {
            FlowStatus::ClearToSend => return Ok(control),
            FlowStatus::Overflow => return Err(IsoTpError::FlowOverflow),
            FlowStatus::Wait => {
                waits += 1;
                if waits > MAX_FLOW_WAIT_FRAMES {
                    return Err(IsoTpError::FlowTimeout);
                }
            }
        }
    }
}

//! One logical CAN bus: observer registry, mailbox pool, bit-rate and the
//! transport it drives, plus the dispatcher feeding received frames to
//! observers.
//!
//! Every piece of shared state sits behind an
//! [`embassy_sync::blocking_mutex::Mutex`], so the same handler can be used
//! from tasks and from the receive interrupt with `CriticalSectionRawMutex`,
//! or single-threaded with `NoopRawMutex`. Locks are held for table updates
//! only; observers always run outside them.
use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};

use crate::config::{CFG_CAN_NUM_MAILBOXES, CFG_CAN_NUM_OBSERVERS};
use crate::core::BusNode;
use crate::error::{RegistryError, SendError, SetupError};
use crate::infra::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::protocol::canopen::{self, nmt::NmtState};
use crate::protocol::dispatch::observer::{ObserverHandle, ObserverTable};
use crate::protocol::dispatch::registry::{MailboxFilter, ObserverRegistry};
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;
use crate::protocol::transport::traits::frame_sender::FrameSender;
use crate::protocol::transport::traits::frame_transport::FrameTransport;

//==================================================================================SHARED_CONTROLLER
/// Arbitrates a physical controller serving two logical buses (CAR2 and
/// single-wire). The last bus set up owns it; the other one goes inactive.
pub struct SharedController<M: RawMutex> {
    owner: Mutex<M, Cell<Option<BusNode>>>,
}

impl<M: RawMutex> Default for SharedController<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> SharedController<M> {
    pub const fn new() -> Self {
        Self {
            owner: Mutex::new(Cell::new(None)),
        }
    }

    /// Hand the controller to `node`.
    pub fn activate(&self, node: BusNode) {
        self.owner.lock(|owner| owner.set(Some(node)));
    }

    pub fn owner(&self) -> Option<BusNode> {
        self.owner.lock(Cell::get)
    }

    pub fn is_active(&self, node: BusNode) -> bool {
        self.owner() == Some(node)
    }
}

//==================================================================================BUS_STATE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BusState {
    pub(crate) speed_kbps: u32,
    pub(crate) set_up: bool,
    pub(crate) master_id: u8,
    pub(crate) heartbeat: NmtState,
}

impl BusState {
    const fn new(speed_kbps: u32) -> Self {
        Self {
            speed_kbps,
            set_up: false,
            master_id: 0,
            heartbeat: NmtState::Operational,
        }
    }
}

//==================================================================================CAN_HANDLER
/// Bus instance. Create one per logical bus and hand it to the device
/// drivers that need it; nothing here is global.
pub struct CanHandler<
    'a,
    M: RawMutex,
    T: FrameTransport,
    const OBSERVERS: usize = { CFG_CAN_NUM_OBSERVERS },
    const MAILBOXES: usize = { CFG_CAN_NUM_MAILBOXES },
> {
    node: BusNode,
    registry: Mutex<M, RefCell<ObserverRegistry<OBSERVERS, MAILBOXES>>>,
    transport: Mutex<M, RefCell<T>>,
    state: Mutex<M, Cell<BusState>>,
    controller: Option<&'a SharedController<M>>,
    diagnostics: Option<&'a (dyn DiagnosticSink + Sync)>,
}

impl<'a, M, T, const OBSERVERS: usize, const MAILBOXES: usize>
    CanHandler<'a, M, T, OBSERVERS, MAILBOXES>
where
    M: RawMutex,
    T: FrameTransport,
{
    /// Bus `node` over `transport`, at the manifest's default bit-rate.
    /// Nothing is sent to the controller before [`setup`](Self::setup).
    pub fn new(node: BusNode, transport: T) -> Self {
        Self {
            node,
            registry: Mutex::new(RefCell::new(ObserverRegistry::new())),
            transport: Mutex::new(RefCell::new(transport)),
            state: Mutex::new(Cell::new(BusState::new(node.default_speed_kbps()))),
            controller: None,
            diagnostics: None,
        }
    }

    /// Declare that this bus shares its controller with its sibling.
    pub fn with_shared_controller(mut self, controller: &'a SharedController<M>) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Report rejected operations to `sink`.
    pub fn with_diagnostics(mut self, sink: &'a (dyn DiagnosticSink + Sync)) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    pub fn node(&self) -> BusNode {
        self.node
    }

    //==================================================================================STATE
    pub(crate) fn state(&self) -> BusState {
        self.state.lock(Cell::get)
    }

    pub(crate) fn update_state(&self, f: impl FnOnce(&mut BusState)) {
        self.state.lock(|cell| {
            let mut state = cell.get();
            f(&mut state);
            cell.set(state);
        });
    }

    pub(crate) fn report(&self, event: DiagnosticEvent) {
        if let Some(sink) = self.diagnostics {
            sink.record(event);
        }
    }

    /// Program the bit-rate and, for a shared controller, take it over.
    ///
    /// Every mailbox of the pool is then reprogrammed from the registry, so
    /// registrations made while the sibling owned the controller reach the
    /// hardware and the sibling's filters are cleared.
    pub fn setup(&self) -> Result<(), SetupError<T::Error>> {
        if self.node.controller_sibling().is_some() && self.controller.is_none() {
            #[cfg(feature = "defmt")]
            defmt::error!("{}: shared controller missing", self.node);
            return Err(SetupError::MissingController);
        }
        let speed = self.bus_speed();
        self.with_transport(|transport| transport.set_bitrate(speed))
            .map_err(SetupError::Hardware)?;
        if let Some(controller) = self.controller {
            controller.activate(self.node);
        }
        self.sync_mailboxes().map_err(SetupError::Hardware)?;
        self.update_state(|state| state.set_up = true);

        #[cfg(feature = "defmt")]
        defmt::info!("{}: set up at {=u32} kbit/s", self.node, speed);
        Ok(())
    }

    /// Current bit-rate in kbit/s. `0` = disabled.
    pub fn bus_speed(&self) -> u32 {
        self.state().speed_kbps
    }

    /// Change the bit-rate. Applied immediately once the bus is set up;
    /// `0` disables the bus.
    pub fn set_bus_speed(&self, kbps: u32) -> Result<(), SetupError<T::Error>> {
        if self.state().set_up && self.owns_controller() {
            self.with_transport(|transport| transport.set_bitrate(kbps))
                .map_err(SetupError::Hardware)?;
        }
        self.update_state(|state| state.speed_kbps = kbps);
        Ok(())
    }

    /// Set up, running, and owning its controller.
    pub fn is_active(&self) -> bool {
        let state = self.state();
        state.set_up && state.speed_kbps != 0 && self.owns_controller()
    }

    /// Whether this bus may program the controller. A bus sharing its
    /// controller owns it only after its own setup, until the sibling's.
    fn owns_controller(&self) -> bool {
        match (self.node.controller_sibling(), self.controller) {
            (None, _) => true,
            (Some(_), Some(controller)) => controller.is_active(self.node),
            (Some(_), None) => false,
        }
    }

    /// Registered filters into their mailboxes, every other mailbox disabled.
    fn sync_mailboxes(&self) -> Result<(), T::Error> {
        self.registry.lock(|registry| {
            let registry = registry.borrow();
            (0..MAILBOXES).try_for_each(|mailbox| {
                let mailbox = mailbox as u8;
                let filter = registry
                    .iter()
                    .find(|entry| entry.mailbox == mailbox)
                    .map(|entry| entry.filter);
                self.with_transport(|transport| {
                    transport.configure_mailbox(mailbox, filter.as_ref())
                })
            })
        })
    }

    //==================================================================================REGISTRY
    /// Deliver frames matching `id`/`mask` to `observer`.
    ///
    /// Returns the mailbox assigned to the filter. While the sibling bus owns
    /// a shared controller the entry is only recorded; the next
    /// [`setup`](Self::setup) programs it. On failure the existing
    /// registrations are untouched and the rejection is reported to the
    /// diagnostics sink.
    pub fn attach(
        &self,
        observer: ObserverHandle,
        id: u32,
        mask: u32,
        extended: bool,
    ) -> Result<u8, RegistryError<T::Error>> {
        let result = self.try_attach(observer, id, mask, extended);
        if result.is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{}: observer {} rejected for id {=u32:#x}",
                self.node,
                observer,
                id
            );
            self.report(DiagnosticEvent::RegistrationRejected { bus: self.node });
        }
        result
    }

    fn try_attach(
        &self,
        observer: ObserverHandle,
        id: u32,
        mask: u32,
        extended: bool,
    ) -> Result<u8, RegistryError<T::Error>> {
        let filter = MailboxFilter::new(id, mask, extended)?;
        self.registry.lock(|registry| {
            let mut registry = registry.borrow_mut();
            let reservation = registry.reserve()?;
            if self.owns_controller() {
                self.with_transport(|transport| {
                    transport.configure_mailbox(reservation.mailbox, Some(&filter))
                })
                .map_err(RegistryError::Hardware)?;
            }
            Ok(registry.commit(reservation, filter, observer).mailbox)
        })
    }

    /// Remove the registration of `observer` for exactly `id`/`mask`.
    ///
    /// Returns `Ok(false)` when there was no such registration.
    pub fn detach(
        &self,
        observer: ObserverHandle,
        id: u32,
        mask: u32,
    ) -> Result<bool, RegistryError<T::Error>> {
        self.registry.lock(|registry| {
            let mut registry = registry.borrow_mut();
            let Some(slot) = registry.locate(observer, id, mask) else {
                return Ok(false);
            };
            if let Some(entry) = registry.get(slot).filter(|_| self.owns_controller()) {
                let mailbox = entry.mailbox;
                self.with_transport(|transport| transport.configure_mailbox(mailbox, None))
                    .map_err(RegistryError::Hardware)?;
            }
            Ok(registry.release(slot).is_some())
        })
    }

    pub fn free_observer_slots(&self) -> usize {
        self.registry.lock(|registry| registry.borrow().free_slots())
    }

    pub fn free_mailboxes(&self) -> usize {
        self.registry.lock(|registry| registry.borrow().free_mailboxes())
    }

    pub fn registered(&self) -> usize {
        self.registry.lock(|registry| registry.borrow().len())
    }

    //==================================================================================DISPATCH
    /// Hand a received frame to every observer whose filter matches, in
    /// registration order. Returns the number of deliveries.
    ///
    /// The registry is copied under the lock and observers run outside it, so
    /// they may send, attach or detach from their handlers. Handles that no
    /// longer resolve in `observers` are skipped (and trip a debug assertion).
    pub fn process<O>(&self, frame: &CanFrame, observers: &mut O) -> usize
    where
        O: ObserverTable + ?Sized,
    {
        if !self.is_active() {
            return 0;
        }
        let entries = self.registry.lock(|registry| registry.borrow().snapshot());

        let mut delivered = 0;
        for entry in entries.iter().flatten() {
            if !entry.filter.matches(&frame.id) {
                continue;
            }
            match observers.observer_mut(entry.observer) {
                Some(observer) => {
                    canopen::deliver(observer, frame);
                    delivered += 1;
                }
                None => {
                    #[cfg(feature = "defmt")]
                    defmt::error!("{}: dangling observer {}", self.node, entry.observer);
                    debug_assert!(false, "observer detached from table but still registered");
                }
            }
        }
        delivered
    }

    //==================================================================================TRANSMIT
    /// Queue `frame` on this bus. Never waits.
    pub fn send_frame(&self, frame: &CanFrame) -> Result<(), SendError<T::Error>> {
        if !self.is_active() {
            self.report(DiagnosticEvent::SendFailed { bus: self.node });
            return Err(SendError::BusInactive);
        }
        self.with_transport(|transport| transport.transmit(frame))
            .map_err(|err| {
                self.report(DiagnosticEvent::SendFailed { bus: self.node });
                SendError::Transport(err)
            })
    }

    /// Trace `frame`, then send it.
    pub fn can_io(&self, frame: &CanFrame) -> Result<(), SendError<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!(
            "{} TX {=u32:#x} [{=usize}] {=[u8]:02x}",
            self.node,
            frame.id.raw(),
            frame.len,
            frame.payload()
        );
        self.send_frame(frame)
    }

    /// Zeroed eight-byte frame for `id`.
    pub fn prepare_output_frame(&self, id: CanId) -> CanFrame {
        CanFrame::prepare_output(id)
    }

    /// Scoped access to the controller driver.
    ///
    /// Do not call back into this bus from `f`: the transport is borrowed.
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.transport
            .lock(|transport| f(&mut transport.borrow_mut()))
    }
}

impl<M, T, const OBSERVERS: usize, const MAILBOXES: usize> FrameSender
    for CanHandler<'_, M, T, OBSERVERS, MAILBOXES>
where
    M: RawMutex,
    T: FrameTransport,
{
    type Error = SendError<T::Error>;

    /// Traced like every other protocol frame, ISO-TP segments included.
    fn send_frame(&self, frame: &CanFrame) -> Result<(), Self::Error> {
        self.can_io(frame)
    }
}

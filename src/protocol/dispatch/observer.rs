//! Consumer side of the dispatcher: the capability trait device drivers
//! implement, and the handle the registry keeps instead of a reference.
use crate::protocol::canopen::sdo::SdoFrame;
use crate::protocol::transport::can_frame::CanFrame;

//==================================================================================PROFILE
/// Per-observer dispatch settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObserverProfile {
    /// Route PDO/SDO traffic of `node_id` to the typed handlers.
    pub canopen_mode: bool,
    /// CANopen node ID (7 bits).
    pub node_id: u8,
}

impl ObserverProfile {
    /// Plain observer: every matching frame goes to `handle_can_frame`.
    pub const fn raw() -> Self {
        Self {
            canopen_mode: false,
            node_id: 0,
        }
    }

    /// CANopen observer tracking `node_id`.
    pub const fn canopen(node_id: u8) -> Self {
        Self {
            canopen_mode: true,
            node_id: node_id & 0x7F,
        }
    }
}

//==================================================================================OBSERVER
/// Capability trait implemented by anything that wants frames from a bus.
///
/// Every handler defaults to a no-op, so an observer only implements what it
/// consumes. Handlers run from the receive path (possibly interrupt level):
/// keep them short and never block.
pub trait CanObserver {
    /// Raw frame matching one of the observer's filters.
    fn handle_can_frame(&mut self, _frame: &CanFrame) {}

    /// PDO addressed to this observer's node (CANopen mode only).
    fn handle_pdo_frame(&mut self, _frame: &CanFrame) {}

    /// SDO request sent to this observer's node (CANopen mode only).
    fn handle_sdo_request(&mut self, _frame: &SdoFrame) {}

    /// SDO response from this observer's node (CANopen mode only).
    fn handle_sdo_response(&mut self, _frame: &SdoFrame) {}

    fn profile(&self) -> &ObserverProfile;

    fn profile_mut(&mut self) -> &mut ObserverProfile;

    fn set_canopen_mode(&mut self, enabled: bool) {
        self.profile_mut().canopen_mode = enabled;
    }

    fn is_canopen(&self) -> bool {
        self.profile().canopen_mode
    }

    /// Node IDs are seven bits wide; higher bits are dropped.
    fn set_node_id(&mut self, node_id: u8) {
        self.profile_mut().node_id = node_id & 0x7F;
    }

    fn node_id(&self) -> u8 {
        self.profile().node_id
    }
}

impl<T: CanObserver + ?Sized> CanObserver for &mut T {
    fn handle_can_frame(&mut self, frame: &CanFrame) {
        (**self).handle_can_frame(frame)
    }

    fn handle_pdo_frame(&mut self, frame: &CanFrame) {
        (**self).handle_pdo_frame(frame)
    }

    fn handle_sdo_request(&mut self, frame: &SdoFrame) {
        (**self).handle_sdo_request(frame)
    }

    fn handle_sdo_response(&mut self, frame: &SdoFrame) {
        (**self).handle_sdo_response(frame)
    }

    fn profile(&self) -> &ObserverProfile {
        (**self).profile()
    }

    fn profile_mut(&mut self) -> &mut ObserverProfile {
        (**self).profile_mut()
    }
}

//==================================================================================HANDLES
/// Non-owning reference to an observer: its index in the application's
/// [`ObserverTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObserverHandle(pub u8);

impl ObserverHandle {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Storage the application keeps its observers in. The bus resolves handles
/// through it at dispatch time; a handle that no longer resolves is skipped.
pub trait ObserverTable {
    fn observer_mut(&mut self, handle: ObserverHandle) -> Option<&mut dyn CanObserver>;
}

impl<O: CanObserver> ObserverTable for [O] {
    fn observer_mut(&mut self, handle: ObserverHandle) -> Option<&mut dyn CanObserver> {
        self.get_mut(handle.index())
            .map(|observer| observer as &mut dyn CanObserver)
    }
}

impl<O: CanObserver, const N: usize> ObserverTable for [O; N] {
    fn observer_mut(&mut self, handle: ObserverHandle) -> Option<&mut dyn CanObserver> {
        self.as_mut_slice().observer_mut(handle)
    }
}

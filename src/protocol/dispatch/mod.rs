//! Frame dispatch: observers, the registry mapping filters to them, and the
//! bus instance that ties registry, transport and dispatcher together.
pub mod bus;
pub mod observer;
pub mod registry;

//! Fixed-capacity observer registry and hardware mailbox pool.
//!
//! The registry maps acceptance filters to observer handles; each entry owns
//! exactly one hardware mailbox. Entries stay dense and in insertion order:
//! releasing one shifts the later entries down.
use crate::error::{CanIdError, CapacityError};
use crate::protocol::dispatch::observer::ObserverHandle;
use crate::protocol::transport::can_id::CanId;

//==================================================================================FILTER
/// Acceptance filter: a frame matches when `frame.id & mask == id & mask`
/// and both use the same identifier format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MailboxFilter {
    pub id: u32,
    pub mask: u32,
    pub extended: bool,
}

impl MailboxFilter {
    /// Validate `id` for its format. Mask bits beyond the format width are dropped.
    pub fn new(id: u32, mask: u32, extended: bool) -> Result<Self, CanIdError> {
        let id = CanId::new(id, extended)?;
        Ok(Self {
            id: id.raw(),
            mask: mask & format_mask(extended),
            extended,
        })
    }

    /// Filter accepting exactly one identifier.
    pub fn exact(id: CanId) -> Self {
        Self {
            id: id.raw(),
            mask: format_mask(id.is_extended()),
            extended: id.is_extended(),
        }
    }

    #[inline]
    pub fn matches(&self, id: &CanId) -> bool {
        id.is_extended() == self.extended && (id.raw() & self.mask) == (self.id & self.mask)
    }
}

/// All identifier bits of the format.
const fn format_mask(extended: bool) -> u32 {
    if extended {
        CanId::MAX_EXTENDED
    } else {
        CanId::MAX_STANDARD
    }
}

//==================================================================================ENTRY
/// One registration: filter, the mailbox programmed with it, and the observer to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObserverEntry {
    pub filter: MailboxFilter,
    pub mailbox: u8,
    pub observer: ObserverHandle,
}

/// Slot and mailbox set aside for a registration that is not committed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    pub slot: usize,
    pub mailbox: u8,
}

//==================================================================================MAILBOX_POOL
/// Hardware mailbox indices `0..MB`, each either free or in use.
#[derive(Debug, Clone, Copy)]
pub struct MailboxPool<const MB: usize> {
    in_use: [bool; MB],
}

impl<const MB: usize> Default for MailboxPool<MB> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const MB: usize> MailboxPool<MB> {
    // Mailbox indices travel as `u8`.
    const INDEX_FITS_U8: () = assert!(MB <= 256);

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::INDEX_FITS_U8;
        Self { in_use: [false; MB] }
    }

    /// Lowest free mailbox.
    pub fn find_free(&self) -> Option<u8> {
        self.in_use
            .iter()
            .position(|used| !used)
            .map(|index| index as u8)
    }

    pub fn claim(&mut self, mailbox: u8) {
        if let Some(slot) = self.in_use.get_mut(mailbox as usize) {
            *slot = true;
        }
    }

    pub fn release(&mut self, mailbox: u8) {
        if let Some(slot) = self.in_use.get_mut(mailbox as usize) {
            *slot = false;
        }
    }

    pub fn is_free(&self, mailbox: u8) -> bool {
        matches!(self.in_use.get(mailbox as usize), Some(false))
    }

    pub fn free_count(&self) -> usize {
        self.in_use.iter().filter(|used| !**used).count()
    }
}

//==================================================================================REGISTRY
/// Observer registry of one bus: at most `N` entries over `MB` mailboxes.
#[derive(Debug, Clone, Copy)]
pub struct ObserverRegistry<const N: usize, const MB: usize> {
    entries: [Option<ObserverEntry>; N],
    len: usize,
    mailboxes: MailboxPool<MB>,
}

impl<const N: usize, const MB: usize> Default for ObserverRegistry<N, MB> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, const MB: usize> ObserverRegistry<N, MB> {
    pub const fn new() -> Self {
        Self {
            entries: [None; N],
            len: 0,
            mailboxes: MailboxPool::new(),
        }
    }

    /// First unused registry slot.
    pub fn find_free_observer_data(&self) -> Option<usize> {
        self.entries.iter().position(Option::is_none)
    }

    /// First unused mailbox.
    pub fn find_free_mailbox(&self) -> Option<u8> {
        self.mailboxes.find_free()
    }

    /// Set aside a slot and a mailbox without touching the table.
    pub fn reserve(&self) -> Result<Reservation, CapacityError> {
        let slot = self
            .find_free_observer_data()
            .ok_or(CapacityError::RegistryFull)?;
        let mailbox = self
            .find_free_mailbox()
            .ok_or(CapacityError::NoFreeMailbox)?;
        Ok(Reservation { slot, mailbox })
    }

    /// Record a registration whose mailbox has been programmed.
    pub fn commit(
        &mut self,
        reservation: Reservation,
        filter: MailboxFilter,
        observer: ObserverHandle,
    ) -> ObserverEntry {
        let entry = ObserverEntry {
            filter,
            mailbox: reservation.mailbox,
            observer,
        };
        self.entries[reservation.slot] = Some(entry);
        self.mailboxes.claim(reservation.mailbox);
        self.len += 1;
        entry
    }

    /// Slot of the registration matching observer, filter id and mask exactly.
    /// The mask is compared after clipping to the entry's identifier width.
    pub fn locate(&self, observer: ObserverHandle, id: u32, mask: u32) -> Option<usize> {
        self.entries.iter().position(|entry| match entry {
            Some(e) => {
                e.observer == observer
                    && e.filter.id == id
                    && e.filter.mask == mask & format_mask(e.filter.extended)
            }
            None => false,
        })
    }

    pub fn get(&self, slot: usize) -> Option<&ObserverEntry> {
        self.entries.get(slot)?.as_ref()
    }

    /// Remove the entry in `slot`, free its mailbox and close the gap.
    pub fn release(&mut self, slot: usize) -> Option<ObserverEntry> {
        let entry = self.entries.get_mut(slot)?.take()?;
        self.mailboxes.release(entry.mailbox);
        self.entries[slot..].rotate_left(1);
        self.len -= 1;
        Some(entry)
    }

    /// Copy of the table, so dispatch can run without holding the lock.
    pub fn snapshot(&self) -> [Option<ObserverEntry>; N] {
        self.entries
    }

    /// Active entries, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ObserverEntry> {
        self.entries.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn free_slots(&self) -> usize {
        N - self.len
    }

    pub fn free_mailboxes(&self) -> usize {
        self.mailboxes.free_count()
    }
}

//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (identifier range, observer
//! registration, transmission, CANopen framing, ISO-TP segmentation).
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors that can occur while building a CAN identifier.
pub enum CanIdError {
    /// Value does not fit in the 11 bits of a standard identifier.
    #[error("Standard identifier out of range: {id:#x}")]
    StandardOutOfRange { id: u32 },
    /// Value does not fit in the 29 bits of an extended identifier.
    #[error("Extended identifier out of range: {id:#x}")]
    ExtendedOutOfRange { id: u32 },
}

//==================================================================================REGISTRY_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Fixed-capacity tables ran out of room.
pub enum CapacityError {
    /// Every observer slot is already taken.
    #[error("Observer registry is full")]
    RegistryFull,
    /// Every hardware mailbox is already assigned.
    #[error("No free mailbox")]
    NoFreeMailbox,
}

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors encountered while attaching or detaching an observer.
pub enum RegistryError<E: core::fmt::Debug> {
    /// Every observer slot is already taken.
    #[error("Observer registry is full")]
    RegistryFull,
    /// Every hardware mailbox is already assigned.
    #[error("No free mailbox")]
    NoFreeMailbox,
    /// Filter identifier does not fit the requested frame format.
    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] CanIdError),
    /// The controller refused the mailbox configuration.
    #[error("Mailbox configuration failed: {0:?}")]
    Hardware(E),
}

impl<E: core::fmt::Debug> From<CapacityError> for RegistryError<E> {
    fn from(err: CapacityError) -> Self {
        match err {
            CapacityError::RegistryFull => RegistryError::RegistryFull,
            CapacityError::NoFreeMailbox => RegistryError::NoFreeMailbox,
        }
    }
}

//==================================================================================BUS_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
/// Errors raised while configuring a bus.
pub enum SetupError<E: core::fmt::Debug> {
    /// The controller refused the bit-rate or a mailbox filter.
    #[error("Controller configuration failed: {0:?}")]
    Hardware(E),
    /// CAR2 or single-wire built without the controller it shares with its sibling.
    #[error("Bus shares its controller but none was provided")]
    MissingController,
}

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors encountered when handing a frame to the transport.
pub enum SendError<E: core::fmt::Debug> {
    /// Bus disabled, never set up, or its controller is owned by the sibling bus.
    #[error("Bus is not active")]
    BusInactive,
    /// Transport refused the frame (queue full, bus-off, ...).
    #[error("CAN transport error: {0:?}")]
    Transport(E),
}

//==================================================================================CANOPEN_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Failures while encoding or decoding an expedited SDO.
pub enum SdoError {
    /// Expedited transfers carry at most four bytes.
    #[error("SDO data too long: {len} bytes (max 4)")]
    DataTooLong { len: usize },
    /// Command byte is not one of write/read/write-ack.
    #[error("Unknown SDO command: {byte:#x}")]
    UnknownCommand { byte: u8 },
    /// SDO frames are always eight bytes long.
    #[error("Invalid SDO frame length: {len}")]
    InvalidLength { len: usize },
    /// Identifier is neither an SDO request nor an SDO response.
    #[error("Not an SDO identifier: {id:#x}")]
    NotSdo { id: u32 },
}

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors raised by the CANopen helpers (build + transmit).
pub enum CanOpenError<E: core::fmt::Debug> {
    /// SDO frame could not be encoded.
    #[error("SDO error: {0}")]
    Sdo(#[from] SdoError),
    /// PDO payloads fit in a single frame.
    #[error("PDO payload too long: {len} bytes (max 8)")]
    PayloadTooLong { len: usize },
    /// Only TPDO 1 to 4 exist.
    #[error("Invalid PDO index: {index}")]
    InvalidPdoIndex { index: u8 },
    /// Raw PDO identifier outside 0x180..=0x57F.
    #[error("Invalid PDO identifier: {id:#x}")]
    InvalidPdoId { id: u16 },
    /// Bus refused the frame.
    #[error("Send failed: {0:?}")]
    Send(SendError<E>),
}

//==================================================================================ISOTP_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
/// Errors encountered while segmenting or pacing an ISO-TP transfer.
pub enum IsoTpError<E: core::fmt::Debug> {
    /// The First frame length field holds 12 bits.
    #[error("ISO-TP payload too large: {len} bytes (max 4095)")]
    PayloadTooLarge { len: usize },
    /// Receiver answered with an overflow flow-control frame.
    #[error("Receiver reported overflow")]
    FlowOverflow,
    /// No flow-control frame arrived in time.
    #[error("Flow-control timeout")]
    FlowTimeout,
    /// Bus refused a frame; the transfer is abandoned.
    #[error("Send failed: {0:?}")]
    Send(E),
}

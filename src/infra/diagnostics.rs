//! Boundary towards the fault/crash recorder. The bus reports rejected
//! operations here; what the sink does with them (ring buffer, NVM, fault
//! lamp) is up to the firmware.
use crate::core::BusNode;

/// Something the bus refused or failed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiagnosticEvent {
    /// `attach` failed: no slot, no mailbox, bad filter or hardware refusal.
    RegistrationRejected { bus: BusNode },
    /// An outgoing CANopen/ISO-TP payload was malformed and not sent.
    MalformedPayload { bus: BusNode },
    /// The transport refused a frame or the bus was inactive.
    SendFailed { bus: BusNode },
}

impl DiagnosticEvent {
    const fn tag(self) -> &'static [u8; 5] {
        match self {
            DiagnosticEvent::RegistrationRejected { .. } => b"CANRG",
            DiagnosticEvent::MalformedPayload { .. } => b"CANMP",
            DiagnosticEvent::SendFailed { .. } => b"CANTX",
        }
    }

    pub const fn bus(self) -> BusNode {
        match self {
            DiagnosticEvent::RegistrationRejected { bus }
            | DiagnosticEvent::MalformedPayload { bus }
            | DiagnosticEvent::SendFailed { bus } => bus,
        }
    }

    /// 32-bit breadcrumb: five 5-bit letters of the tag, then a 7-bit counter
    /// holding the bus index.
    pub const fn breadcrumb(self) -> u32 {
        encode_breadcrumb(self.tag()) + self.bus().index() as u32
    }
}

/// Pack five upper-case letters into bits 31..7 (`A` = 1, `Z` = 26).
pub const fn encode_breadcrumb(tag: &[u8; 5]) -> u32 {
    let mut code = 0u32;
    let mut i = 0;
    while i < 5 {
        code |= ((tag[i].wrapping_sub(0x40) & 0x1F) as u32) << (27 - 5 * i as u32);
        i += 1;
    }
    code
}

/// Receiver of diagnostic events. Called from the failing operation's
/// context, which may be an interrupt: record and return.
pub trait DiagnosticSink {
    fn record(&self, event: DiagnosticEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Letters land in 5-bit fields from bit 27 down to bit 7.
    fn breadcrumb_layout() {
        let code = encode_breadcrumb(b"ABCDE");
        assert_eq!(code >> 27, 1);
        assert_eq!((code >> 22) & 0x1F, 2);
        assert_eq!((code >> 17) & 0x1F, 3);
        assert_eq!((code >> 12) & 0x1F, 4);
        assert_eq!((code >> 7) & 0x1F, 5);
        assert_eq!(code & 0x7F, 0);
    }

    #[test]
    /// The counter bits identify the bus.
    fn event_breadcrumb_carries_bus() {
        let ev = DiagnosticEvent::SendFailed { bus: BusNode::Ev }.breadcrumb();
        let sw = DiagnosticEvent::SendFailed {
            bus: BusNode::SingleWire,
        }
        .breadcrumb();
        assert_eq!(ev & !0x7F, sw & !0x7F);
        assert_eq!(ev & 0x7F, BusNode::Ev.index() as u32);
        assert_eq!(sw & 0x7F, BusNode::SingleWire.index() as u32);
        assert_eq!(ev & !0x7F, encode_breadcrumb(b"CANTX"));
    }
}

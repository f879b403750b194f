//! CANopen traffic through a bus: a VCU master driving a node and a node
//! driver observing its PDO/SDO traffic.
mod helpers;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use helpers::{Collector, EventLog, MockTransport, Wire};
use vcu_can::{
    core::BusNode,
    error::{CanOpenError, SdoError},
    infra::diagnostics::DiagnosticEvent,
    protocol::{
        canopen::{
            nmt::{parse_heartbeat, NmtState},
            pdo::rpdo_id,
            sdo::{SdoCommand, SdoDirection, SdoFrame},
        },
        dispatch::{bus::CanHandler, observer::ObserverHandle},
        transport::{can_frame::CanFrame, can_id::CanId},
    },
};

type Bus<'a> = CanHandler<'a, NoopRawMutex, MockTransport>;

const NODE: u8 = 5;

fn car_bus<'a>() -> (Bus<'a>, Wire) {
    let (transport, wire) = MockTransport::create_pair();
    let bus = Bus::new(BusNode::Car, transport);
    bus.setup().unwrap();
    bus.set_master_id(0x01);
    (bus, wire)
}

#[test]
/// Boot sequence of a node: reset, heartbeat, start, then PDO exchange.
fn test_master_drives_node() {
    let (bus, mut wire) = car_bus();

    bus.send_node_reset(NODE).unwrap();
    bus.set_heartbeat_state(NmtState::PreOperational);
    bus.send_heartbeat().unwrap();
    bus.send_node_start(NODE).unwrap();
    bus.set_heartbeat_state(NmtState::Operational);
    bus.send_heartbeat().unwrap();
    bus.send_pdo_message(1, &[0x10, 0x27]).unwrap();

    let frames = wire.drain();
    let summary: Vec<(u32, Vec<u8>)> = frames
        .iter()
        .map(|frame| (frame.id.raw(), frame.payload().to_vec()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (0x000, vec![0x81, NODE]),
            (0x701, vec![0x7F]),
            (0x000, vec![0x01, NODE]),
            (0x701, vec![0x05]),
            (0x181, vec![0x10, 0x27]),
        ]
    );
    assert_eq!(
        parse_heartbeat(&frames[3]),
        Some((0x01, NmtState::Operational))
    );
}

#[test]
/// A node driver sees its PDOs and SDO exchanges decoded, the rest raw.
fn test_node_driver_observes_traffic() {
    let (bus, _wire) = car_bus();
    // Everything from node 5, whatever the function code.
    bus.attach(ObserverHandle(0), NODE as u32, 0x07F, false)
        .unwrap();
    let mut observers = [Collector::canopen(NODE)];

    let rpdo = CanFrame::new(rpdo_id(2, NODE).unwrap(), &[1, 2, 3]).unwrap();
    let tpdo = CanFrame::new(CanId::standard(0x185).unwrap(), &[4]).unwrap();
    let request = SdoFrame::read(NODE, 0x6041, 0)
        .encode(SdoDirection::Request)
        .unwrap();
    let response = SdoFrame::write(NODE, 0x6041, 0, &[0x37, 0x02])
        .unwrap()
        .encode(SdoDirection::Response)
        .unwrap();
    let heartbeat = CanFrame::new(CanId::standard(0x705).unwrap(), &[0x05]).unwrap();

    for frame in [rpdo, tpdo, request, response, heartbeat] {
        assert_eq!(bus.process(&frame, &mut observers), 1);
    }

    let driver = &observers[0];
    assert_eq!(driver.pdos.len(), 2);
    assert_eq!(driver.pdos[0].id.raw(), 0x305);
    assert_eq!(driver.sdo_requests.len(), 1);
    assert_eq!(driver.sdo_requests[0].command, SdoCommand::Read);
    assert_eq!(driver.sdo_responses.len(), 1);
    assert_eq!(driver.sdo_responses[0].index, 0x6041);
    assert_eq!(driver.sdo_responses[0].payload(), &[0x37, 0x02]);
    assert_eq!(driver.frames.len(), 1);
    assert_eq!(parse_heartbeat(&driver.frames[0]), Some((NODE, NmtState::Operational)));
}

#[test]
/// Expedited SDO write and its acknowledgement, byte for byte.
fn test_sdo_round_trip_on_the_wire() {
    let (bus, mut wire) = car_bus();

    let write = SdoFrame::write(NODE, 0x2100, 1, &[0xAB, 0xCD]).unwrap();
    bus.send_sdo_request(&write).unwrap();
    bus.send_sdo_response(&SdoFrame::write_ack(NODE, 0x2100, 1))
        .unwrap();

    let frames = wire.drain();
    assert_eq!(frames[0].id.raw(), 0x605);
    assert_eq!(frames[0].data, [0x2B, 0x00, 0x21, 0x01, 0xAB, 0xCD, 0x00, 0x00]);
    assert_eq!(frames[1].id.raw(), 0x585);
    assert_eq!(frames[1].data, [0x60, 0x00, 0x21, 0x01, 0x00, 0x00, 0x00, 0x00]);

    let (direction, decoded) = SdoFrame::decode(&frames[0]).unwrap();
    assert_eq!(direction, SdoDirection::Request);
    assert_eq!(decoded, write);
}

#[test]
/// Malformed outgoing payloads are refused and reported, never sent.
fn test_rejections_are_reported() {
    let log = EventLog::default();
    let (transport, mut wire) = MockTransport::create_pair();
    let bus = Bus::new(BusNode::Ev, transport).with_diagnostics(&log);
    bus.setup().unwrap();

    assert_eq!(
        SdoFrame::write(NODE, 0x2100, 1, &[0; 5]),
        Err(SdoError::DataTooLong { len: 5 })
    );
    assert_eq!(
        bus.send_pdo_message(7, &[1]),
        Err(CanOpenError::InvalidPdoIndex { index: 7 })
    );
    assert_eq!(
        bus.send_pdo_raw(0x100, &[1]),
        Err(CanOpenError::InvalidPdoId { id: 0x100 })
    );

    assert!(wire.drain().is_empty());
    assert_eq!(
        log.events(),
        vec![DiagnosticEvent::MalformedPayload { bus: BusNode::Ev }; 2]
    );
}

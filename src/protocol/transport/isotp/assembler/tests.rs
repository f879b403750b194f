use super::*;
use crate::protocol::transport::isotp::FlowStatus;

#[test]
/// A Single frame completes immediately.
fn test_single_frame() {
    let mut assembler: IsoTpAssembler = IsoTpAssembler::new();
    match assembler.process_frame(&[0x03, 0x62, 0xF1, 0x90]) {
        ProcessResult::MessageComplete(payload) => assert_eq!(payload, &[0x62, 0xF1, 0x90]),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!assembler.in_progress());
}

#[test]
/// Single frames with a zero or impossible length are dropped.
fn test_malformed_single_frame() {
    let mut assembler: IsoTpAssembler<64> = IsoTpAssembler::new();
    assert_eq!(assembler.process_frame(&[0x00, 1, 2]), ProcessResult::Ignored);
    assert_eq!(assembler.process_frame(&[0x05, 1, 2]), ProcessResult::Ignored);
    assert_eq!(assembler.process_frame(&[0x08, 1, 2, 3, 4, 5, 6, 7]), ProcessResult::Ignored);
    assert_eq!(assembler.process_frame(&[]), ProcessResult::Ignored);
}

#[test]
/// First frame triggers a clear-to-send answer carrying the receiver parameters.
fn test_first_frame_requests_flow_control() {
    let mut assembler: IsoTpAssembler<64> = IsoTpAssembler::with_flow(4, 10);
    let result = assembler.process_frame(&[0x10, 0x14, 0, 1, 2, 3, 4, 5]);
    assert_eq!(
        result,
        ProcessResult::SendFlowControl(FlowControl::clear_to_send(4, 10))
    );
    assert!(assembler.in_progress());
}

#[test]
/// 20-byte message: First frame plus two consecutive frames.
fn test_complete_message() {
    let mut assembler: IsoTpAssembler<64> = IsoTpAssembler::new();
    assembler.process_frame(&[0x10, 20, 0, 1, 2, 3, 4, 5]);
    assert_eq!(
        assembler.process_frame(&[0x21, 6, 7, 8, 9, 10, 11, 12]),
        ProcessResult::FragmentConsumed
    );
    match assembler.process_frame(&[0x22, 13, 14, 15, 16, 17, 18, 19]) {
        ProcessResult::MessageComplete(payload) => {
            let expected: [u8; 20] = core::array::from_fn(|i| i as u8);
            assert_eq!(payload, &expected);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!assembler.in_progress());
}

#[test]
/// Out-of-order consecutive frame abandons the reception.
fn test_sequence_gap_resets() {
    let mut assembler: IsoTpAssembler<64> = IsoTpAssembler::new();
    assembler.process_frame(&[0x10, 20, 0, 1, 2, 3, 4, 5]);
    assert_eq!(
        assembler.process_frame(&[0x22, 13, 14, 15, 16, 17, 18, 19]),
        ProcessResult::SequenceGap {
            expected: 1,
            received: 2
        }
    );
    assert!(!assembler.in_progress());
    // Late frames of the dead session are ignored.
    assert_eq!(
        assembler.process_frame(&[0x21, 6, 7, 8, 9, 10, 11, 12]),
        ProcessResult::Ignored
    );
}

#[test]
/// Message larger than the buffer is refused with an overflow answer.
fn test_overflow() {
    let mut assembler: IsoTpAssembler<16> = IsoTpAssembler::new();
    match assembler.process_frame(&[0x10, 20, 0, 1, 2, 3, 4, 5]) {
        ProcessResult::SendFlowControl(control) => {
            assert_eq!(control.status, FlowStatus::Overflow)
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!assembler.in_progress());
}

#[test]
/// A new clear-to-send is requested after every full block.
fn test_block_size_pacing() {
    let mut assembler: IsoTpAssembler<64> = IsoTpAssembler::with_flow(1, 0);
    assembler.process_frame(&[0x10, 27, 0, 1, 2, 3, 4, 5]);
    assert_eq!(
        assembler.process_frame(&[0x21, 6, 7, 8, 9, 10, 11, 12]),
        ProcessResult::SendFlowControl(FlowControl::clear_to_send(1, 0))
    );
    assert_eq!(
        assembler.process_frame(&[0x22, 13, 14, 15, 16, 17, 18, 19]),
        ProcessResult::SendFlowControl(FlowControl::clear_to_send(1, 0))
    );
    assert!(matches!(
        assembler.process_frame(&[0x23, 20, 21, 22, 23, 24, 25, 26]),
        ProcessResult::MessageComplete(payload) if payload.len() == 27
    ));
}

#[test]
/// A Single frame in the middle of a reception replaces it.
fn test_single_frame_aborts_session() {
    let mut assembler: IsoTpAssembler<64> = IsoTpAssembler::new();
    assembler.process_frame(&[0x10, 20, 0, 1, 2, 3, 4, 5]);
    assert!(matches!(
        assembler.process_frame(&[0x01, 0x7E]),
        ProcessResult::MessageComplete(&[0x7E])
    ));
    assert!(!assembler.in_progress());
}

#[test]
/// Flow frames belong to the sending side.
fn test_flow_frame_ignored() {
    let mut assembler: IsoTpAssembler<64> = IsoTpAssembler::new();
    assert_eq!(assembler.process_frame(&[0x30, 0, 0]), ProcessResult::Ignored);
}

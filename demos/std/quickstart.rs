//! # Quickstart Example
//!
//! Minimal tour of vcu-can on a desktop:
//! - Set up a bus over a printing transport
//! - Attach observers and dispatch received frames
//! - Drive a CANopen node (NMT, heartbeat, PDO, SDO)
//! - Send an ISO-TP message larger than one frame
//!
//! ```bash
//! cargo run --example quickstart
//! ```

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use vcu_can::core::{BusNode, IoChannel};
use vcu_can::protocol::canopen::sdo::{SdoDirection, SdoFrame};
use vcu_can::protocol::dispatch::bus::CanHandler;
use vcu_can::protocol::dispatch::observer::{CanObserver, ObserverHandle, ObserverProfile};
use vcu_can::protocol::dispatch::registry::MailboxFilter;
use vcu_can::protocol::transport::can_frame::CanFrame;
use vcu_can::protocol::transport::can_id::CanId;
use vcu_can::protocol::transport::traits::frame_transport::FrameTransport;
use vcu_can::protocol::transport::traits::isotp_sender::IsoTpSender;

/// Transport printing what a real controller would put on the wire.
struct ConsoleTransport;

impl FrameTransport for ConsoleTransport {
    type Error = ();

    fn transmit(&mut self, frame: &CanFrame) -> Result<(), Self::Error> {
        print!("   TX 0x{:03X} [{}]", frame.id.raw(), frame.len);
        for byte in frame.payload() {
            print!(" {:02X}", byte);
        }
        println!();
        Ok(())
    }

    fn configure_mailbox(
        &mut self,
        mailbox: u8,
        filter: Option<&MailboxFilter>,
    ) -> Result<(), Self::Error> {
        match filter {
            Some(f) => println!("   mailbox {mailbox}: id 0x{:03X} mask 0x{:03X}", f.id, f.mask),
            None => println!("   mailbox {mailbox}: disabled"),
        }
        Ok(())
    }

    fn set_bitrate(&mut self, kbps: u32) -> Result<(), Self::Error> {
        println!("   bit-rate: {kbps} kbit/s");
        Ok(())
    }
}

/// Driver for the switch panel broadcast.
struct SwitchPanel {
    profile: ObserverProfile,
    state: u8,
}

impl CanObserver for SwitchPanel {
    fn handle_can_frame(&mut self, frame: &CanFrame) {
        if IoChannel::of_frame(frame) == Some(IoChannel::Switch) {
            self.state = frame.data[0];
        }
    }

    fn profile(&self) -> &ObserverProfile {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut ObserverProfile {
        &mut self.profile
    }
}

fn main() {
    println!("=== vcu-can Quickstart ===\n");

    // ======================================================================
    // 1. Set up the EV bus
    // ======================================================================
    println!("1. Setting up the {} bus", BusNode::Ev.name());
    let bus: CanHandler<'_, NoopRawMutex, ConsoleTransport> =
        CanHandler::new(BusNode::Ev, ConsoleTransport);
    if let Err(e) = bus.setup() {
        eprintln!("   Setup error: {:?}", e);
        return;
    }
    println!("   Active: {}\n", bus.is_active());

    // ======================================================================
    // 2. Attach an observer and dispatch a received frame
    // ======================================================================
    println!("2. Dispatching the switch broadcast");
    let filter = IoChannel::Switch.filter();
    match bus.attach(ObserverHandle(0), filter.id, filter.mask, filter.extended) {
        Ok(mailbox) => println!("   Switch panel on mailbox {mailbox}"),
        Err(e) => eprintln!("   Attach error: {:?}", e),
    }

    let mut observers = [SwitchPanel {
        profile: ObserverProfile::raw(),
        state: 0,
    }];
    if let Some(frame) = IoChannel::Switch.frame(&[0b0000_0101]) {
        let delivered = bus.process(&frame, &mut observers);
        println!("   Delivered to {delivered} observer(s)");
    }
    println!("   Switch state: {:08b}\n", observers[0].state);

    // ======================================================================
    // 3. Drive a CANopen node
    // ======================================================================
    println!("3. CANopen master at node 0x01, slave node 0x05");
    bus.set_master_id(0x01);
    let node = 5;

    let _ = bus.send_node_start(node);
    let _ = bus.send_heartbeat();
    let _ = bus.send_pdo_message(1, &[0x10, 0x27]);

    match SdoFrame::write(node, 0x2100, 1, &[0xAB, 0xCD]) {
        Ok(write) => {
            let _ = bus.send_sdo_request(&write);
            if let Ok(frame) = write.encode(SdoDirection::Request) {
                println!("   Encoded SDO: {:02X?}", frame.data);
            }
        }
        Err(e) => eprintln!("   SDO error: {:?}", e),
    }
    println!();

    // ======================================================================
    // 4. ISO-TP message over several frames
    // ======================================================================
    println!("4. Sending a 20-byte ISO-TP message");
    let message: Vec<u8> = (0..20).collect();
    let id = CanId::standard(0x7E0).expect("valid identifier");
    match bus.send_isotp(id, &message) {
        Ok(frames) => println!("   {frames} frames sent\n"),
        Err(e) => eprintln!("   ISO-TP error: {:?}\n", e),
    }

    println!("=== Done ===");
}

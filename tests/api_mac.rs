//! MAC API against a scripted co-processor.

mod common;

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;
use npi154::api::pib::{fh_attr, mac_attr, security_attr};
use npi154::api::{
    Address, ApiMac, ApiMacCallbacks, AssociateRequest, CapabilityInfo, DataInd, MacStatus,
    ScanCnf, ScanCnfResult, SecurityLevelEntry, StartCnf, parse_payload_group_ies,
};
use npi154::mt::{mac, util};
use npi154::protocol::{MtFrame, SUBSYSTEM_MASK, Subsystem, encode_uart, metrics};
use npi154::transport::NpiConfig;

use common::{Device, connect, ok_status, serve};

const WAIT: Duration = Duration::from_secs(2);
const EXT_ADDR: [u8; 8] = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];

fn start<F>(handler: F) -> (ApiMac, JoinHandle<Vec<MtFrame>>)
where
    F: FnMut(&Device, &MtFrame) + Send + 'static,
{
    let (npi, device) = connect(NpiConfig::default());
    let device = serve(device, handler);
    (ApiMac::new(npi).unwrap(), device)
}

fn finish(mut mac: ApiMac, device: JoinHandle<Vec<MtFrame>>) -> Vec<MtFrame> {
    mac.close();
    device.join().unwrap()
}

fn subsystem(frame: &MtFrame) -> u8 {
    frame.cmd0() & SUBSYSTEM_MASK
}

fn descriptor(short_addr: u16, channel: u8) -> Vec<u8> {
    let mut bytes = vec![0x02];
    bytes.extend(short_addr.to_le_bytes());
    bytes.extend([0u8; 6]);
    bytes.extend(0xABCDu16.to_le_bytes());
    bytes.extend(0xCFFFu16.to_le_bytes());
    bytes.extend([channel, 0, 0, 200]);
    bytes.extend(1000u32.to_le_bytes());
    bytes.push(0);
    bytes.extend([0u8; 11]);
    bytes
}

fn data_ind_attrs(msdu: &[u8], payload_ie: &[u8]) -> Vec<u8> {
    let mut attrs = vec![0x02, 0x01, 0x00, 0, 0, 0, 0, 0, 0];
    attrs.push(0x03);
    attrs.extend(EXT_ADDR);
    attrs.extend(16u32.to_le_bytes());
    attrs.extend(0u16.to_le_bytes());
    attrs.extend(0xABCDu16.to_le_bytes());
    attrs.extend(0xABCDu16.to_le_bytes());
    attrs.extend([200, 0, 0xC4, 7]);
    attrs.extend([0u8; 11]);
    attrs.extend(5u32.to_le_bytes());
    attrs.extend(u16::try_from(msdu.len()).unwrap().to_le_bytes());
    attrs.extend(u16::try_from(payload_ie.len()).unwrap().to_le_bytes());
    attrs.extend(msdu);
    attrs.extend(payload_ie);
    attrs
}

fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn test_init_programs_extended_address() {
    let (mut mac, device) = start(|device, request| {
        match (subsystem(request), request.cmd1()) {
            (2, mac::cmd::FH_ENABLE_REQ | mac::cmd::RESET_REQ | mac::cmd::SET_REQ) => {
                ok_status(device, request);
            }
            (7, util::cmd::GET_EXT_ADDR) => {
                let mut attrs = vec![0x00];
                attrs.extend(EXT_ADDR);
                device.reply(request, &attrs);
            }
            other => panic!("unexpected request {other:?}"),
        }
    });

    assert_eq!(mac.ext_addr(), None);
    assert_eq!(mac.init(true).unwrap(), EXT_ADDR);
    assert_eq!(mac.ext_addr(), Some(EXT_ADDR));

    let seen = finish(mac, device);
    let order: Vec<u8> = seen.iter().map(MtFrame::cmd1).collect();
    assert_eq!(
        order,
        [
            mac::cmd::FH_ENABLE_REQ,
            mac::cmd::RESET_REQ,
            util::cmd::GET_EXT_ADDR,
            mac::cmd::SET_REQ,
        ]
    );
    assert_eq!(seen[1].attrs().as_ref(), &[0x01]);
    assert_eq!(seen[2].attrs().as_ref(), &[util::ext_addr_type::PRIMARY]);

    let set = seen[3].attrs();
    assert_eq!(set.len(), 17);
    assert_eq!(set[0], mac_attr::EXTENDED_ADDRESS);
    assert_eq!(set[1..9], EXT_ADDR);
    assert!(set[9..].iter().all(|&b| b == 0));
}

#[test]
fn test_init_continues_past_failed_reset() {
    let (mut mac, device) = start(|device, request| match request.cmd1() {
        mac::cmd::RESET_REQ => device.reply(request, &[0xE8]),
        util::cmd::GET_EXT_ADDR => {
            let mut attrs = vec![0x00];
            attrs.extend(EXT_ADDR);
            device.reply(request, &attrs);
        }
        _ => ok_status(device, request),
    });

    assert_eq!(mac.init(false).unwrap(), EXT_ADDR);
    let seen = finish(mac, device);
    assert_eq!(seen.len(), 3);
}

#[test]
fn test_associate_capability_on_the_wire() {
    let (mac, device) = start(ok_status);

    let status = mac
        .mlme_associate_req(&AssociateRequest {
            logical_channel: 11,
            coord_address: Address::Short(0x0000),
            coord_pan_id: 0xABCD,
            capability_information: CapabilityInfo {
                ffd: true,
                rx_on_when_idle: true,
                ..CapabilityInfo::default()
            },
            ..AssociateRequest::default()
        })
        .unwrap();
    assert!(status.is_success());

    let seen = finish(mac, device);
    let frame = &seen[0];
    assert_eq!(frame.cmd0(), 0x22);
    assert_eq!(frame.cmd1(), mac::cmd::ASSOCIATE_REQ);
    assert_eq!(frame.attrs().len(), 0x1A);
    assert_eq!(frame.attrs()[0], 11);
    assert_eq!(frame.attrs()[12..14], [0xCD, 0xAB]);
    assert_eq!(frame.attrs()[14], 0x0A);
}

#[test]
fn test_set_u16_padded_to_value_field() {
    let (mac, device) = start(ok_status);

    let status = mac.mlme_set_req_u16(mac_attr::PAN_ID, 0xBEEF).unwrap();
    assert_eq!(status, MacStatus::SUCCESS);

    let seen = finish(mac, device);
    let frame = &seen[0];
    let mut expected = vec![mac_attr::PAN_ID, 0xEF, 0xBE];
    expected.resize(17, 0);
    assert_eq!(frame.attrs().as_ref(), expected.as_slice());

    let uart = encode_uart(frame);
    assert_eq!(uart[..7], [0xFE, 0x11, 0x22, 0x09, 0x50, 0xEF, 0xBE]);
    assert_eq!(uart.len(), 1 + 3 + 17 + 1);
    assert_eq!(uart[uart.len() - 1], 0x3B);
}

#[test]
fn test_get_widths_zero_pad_short_values() {
    let (mac, device) = start(|device, request| match request.attrs()[0] {
        mac_attr::PAN_ID => device.reply(request, &[0x00, 0xCD, 0xAB]),
        mac_attr::BEACON_TX_TIME => device.reply(request, &[0x00, 0x01]),
        _ => device.reply(request, &[0xF4]),
    });

    assert_eq!(
        mac.mlme_get_req_u16(mac_attr::PAN_ID).unwrap(),
        (MacStatus::SUCCESS, 0xABCD)
    );
    assert_eq!(
        mac.mlme_get_req_u32(mac_attr::BEACON_TX_TIME).unwrap(),
        (MacStatus::SUCCESS, 1)
    );
    let (status, value) = mac.mlme_get_req_u8(mac_attr::DSN).unwrap();
    assert!(!status.is_success());
    assert_eq!(value, 0);

    finish(mac, device);
}

#[test]
fn test_fh_array_set_sized_by_length_read() {
    let (mac, device) = start(|device, request| match request.cmd1() {
        mac::cmd::FH_GET_REQ => device.reply(request, &[0x00, 0xAA, 0xBB, 0xCC]),
        _ => ok_status(device, request),
    });

    let status = mac
        .mlme_set_fh_req_array(fh_attr::UC_EXCLUDED_CHANNELS, &[1, 2, 3, 4, 5])
        .unwrap();
    assert!(status.is_success());

    let seen = finish(mac, device);
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].cmd1(), mac::cmd::FH_GET_REQ);
    assert_eq!(seen[0].attrs().as_ref(), &[0x02, 0x20]);
    assert_eq!(seen[1].cmd1(), mac::cmd::FH_SET_REQ);
    assert_eq!(seen[1].attrs().as_ref(), &[0x02, 0x20, 1, 2, 3]);
}

#[test]
fn test_security_level_entry_uses_index() {
    let (mac, device) = start(|device, request| match request.cmd1() {
        mac::cmd::SECURITY_GET_REQ => device.reply(request, &[0x00, 0x00, 0x00, 9, 9, 9, 9]),
        _ => ok_status(device, request),
    });

    let entry = SecurityLevelEntry {
        level_index: 3,
        frame_type: 1,
        command_frame_identifier: 0,
        security_minimum: 5,
        security_override_minimum: true,
    };
    assert!(mac.mlme_set_security_level_entry(&entry).unwrap().is_success());

    let seen = finish(mac, device);
    assert_eq!(seen[0].attrs().as_ref(), &[security_attr::SECURITY_LEVEL_ENTRY, 0, 0]);
    assert_eq!(
        seen[1].attrs().as_ref(),
        &[security_attr::SECURITY_LEVEL_ENTRY, 3, 0, 1, 0, 5, 1]
    );
}

#[test]
fn test_small_helpers() {
    let (mac, device) = start(|device, request| match (subsystem(request), request.cmd1()) {
        (7, util::cmd::RANDOM) => device.reply(request, &[0x34, 0x12]),
        (2, mac::cmd::UPDATE_PANID_REQ) => device.reply(request, &[0xE8]),
        _ => ok_status(device, request),
    });

    assert_eq!(mac.random_byte().unwrap(), 0x34);
    assert_eq!(mac.update_pan_id(0xABCD).unwrap(), MacStatus::from(0xE8));

    let seen = finish(mac, device);
    assert_eq!(seen[1].attrs().as_ref(), &[0xCD, 0xAB]);
}

#[test]
fn test_scan_confirm_list_released_after_callback() {
    let (npi, device) = connect(NpiConfig::default());
    let mut mac = ApiMac::new(npi).unwrap();

    let (tx, rx) = unbounded();
    mac.register_callbacks(ApiMacCallbacks {
        scan_cnf: Some(Box::new(move |cnf: &ScanCnf| {
            if let ScanCnfResult::PanDescriptors(list) = &cnf.result {
                let _ = tx.send((list.to_vec(), Arc::downgrade(list)));
            }
        })),
        ..ApiMacCallbacks::default()
    });

    let mut attrs = vec![0x00, mac::scan_type::ACTIVE, 0, 1];
    attrs.extend([0u8; 17]);
    attrs.push(2);
    attrs.extend(descriptor(0x1234, 11));
    attrs.extend(descriptor(0x5678, 12));
    device.indicate(Subsystem::Mac, mac::cmd::SCAN_CNF, &attrs);

    let (descriptors, list) = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].coord_address, Address::Short(0x1234));
    assert_eq!(descriptors[0].coord_pan_id, 0xABCD);
    assert_eq!(descriptors[1].logical_channel, 12);
    assert_eq!(descriptors[1].link_quality, 200);
    assert!(wait_until(|| list.upgrade().is_none()));

    mac.close();
}

#[test]
fn test_data_indication_payload_ies() {
    let (npi, device) = connect(NpiConfig::default());
    let mut mac = ApiMac::new(npi).unwrap();

    let (tx, rx) = unbounded();
    mac.register_callbacks(ApiMacCallbacks {
        data_ind: Some(Box::new(move |ind: &DataInd| {
            let _ = tx.send(ind.clone());
        })),
        ..ApiMacCallbacks::default()
    });

    device.indicate(
        Subsystem::Mac,
        mac::cmd::DATA_IND,
        &data_ind_attrs(b"hello", &[0x00, 0xF8]),
    );
    device.indicate(
        Subsystem::Mac,
        mac::cmd::DATA_IND,
        &data_ind_attrs(b"", &[0x02, 0x88, 0xAA, 0xBB, 0x00, 0xF8]),
    );

    let first = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(first.src_addr, Address::Short(0x0001));
    assert_eq!(first.dst_addr, Address::Extended(EXT_ADDR));
    assert_eq!(first.rssi, -60);
    assert_eq!(first.msdu.as_ref(), b"hello");
    assert_eq!(parse_payload_group_ies(&first.payload_ie), Ok(vec![]));

    let second = rx.recv_timeout(WAIT).unwrap();
    let ies = parse_payload_group_ies(&second.payload_ie).unwrap();
    assert_eq!(ies.len(), 1);
    assert!(ies[0].type_long);
    assert_eq!(ies[0].id, 1);
    assert_eq!(ies[0].content, &[0xAA, 0xBB]);

    mac.close();
}

#[test]
fn test_indications_without_callback_and_malformed_are_dropped() {
    let (npi, device) = connect(NpiConfig::default());
    let mut mac = ApiMac::new(npi).unwrap();
    let before = metrics::snapshot();

    // No callback registered yet
    device.indicate(Subsystem::Mac, mac::cmd::START_CNF, &[0x00]);
    // Truncated
    device.indicate(Subsystem::Mac, mac::cmd::DATA_CNF, &[0x00]);
    // Unknown command
    device.indicate(Subsystem::Mac, 0xFE, &[0x00]);
    assert!(wait_until(|| {
        metrics::snapshot().areq_dropped >= before.areq_dropped + 2
    }));

    let (tx, rx) = unbounded();
    mac.register_callbacks(ApiMacCallbacks {
        start_cnf: Some(Box::new(move |cnf: &StartCnf| {
            let _ = tx.send(cnf.status);
        })),
        ..ApiMacCallbacks::default()
    });
    device.indicate(Subsystem::Mac, mac::cmd::START_CNF, &[0xE8]);
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), MacStatus::from(0xE8));
    assert!(rx.try_recv().is_err());

    mac.close();
    // Idempotent, and Drop closes again
    mac.close();
}

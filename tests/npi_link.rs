//! NPI link behaviour against a scripted co-processor.

mod common;

use std::thread;
use std::time::Duration;

use bytes::Bytes;
use npi154::mt::sys::{
    self, MtSys, NvItemId, NvReadReq, NvUpdateReq, PingReq, Version, VersionReq,
};
use npi154::mt::MtRequest;
use npi154::protocol::{CommandType, MtError, MtFrame, Subsystem, encode_uart, metrics};
use npi154::transport::{NpiConfig, TransportError};

use common::{connect, serve, srsp_for};

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn test_request_round_trip() {
    let (npi, device) = connect(NpiConfig::default());
    let device = serve(device, |device, request| {
        assert_eq!(request.cmd0(), 0x21);
        match request.cmd1() {
            sys::cmd::PING_REQ => device.reply(request, &[0x59, 0x06]),
            sys::cmd::VERSION_REQ => device.reply(request, &[2, 0, 1, 2, 3]),
            other => panic!("unexpected request {other:#04x}"),
        }
    });

    let sys = MtSys::new(&npi);
    assert_eq!(sys.ping_req().unwrap(), 0x0659);
    assert_eq!(
        sys.version_req().unwrap(),
        Version {
            transport: 2,
            product: 0,
            major: 1,
            minor: 2,
            maint: 3,
        }
    );

    npi.close();
    let seen = device.join().unwrap();
    assert_eq!(seen.len(), 2);
}

#[test]
fn test_nv_update_then_read() {
    let (npi, device) = connect(NpiConfig::default());
    let device = serve(device, |device, request| match request.cmd1() {
        sys::cmd::NV_UPDATE_REQ => device.reply(request, &[0x00]),
        sys::cmd::NV_READ_REQ => device.reply(request, &[0x00, 0x02, 0x11, 0x22]),
        other => panic!("unexpected request {other:#04x}"),
    });

    let item = NvItemId {
        sys_id: 3,
        item_id: 0x0001,
        sub_id: 0x0000,
    };
    let sys = MtSys::new(&npi);
    let update = NvUpdateReq {
        item,
        data: Bytes::from_static(&[0x11, 0x22]),
    };
    assert_eq!(sys.nv_update_req(&update).unwrap(), 0x00);
    let read = NvReadReq {
        item,
        offset: 0,
        length: 2,
    };
    let rsp = sys.nv_read_req(&read).unwrap();
    assert_eq!(rsp.data.as_ref(), &[0x11, 0x22]);

    npi.close();
    let seen = device.join().unwrap();
    assert_eq!(seen[0].attrs().as_ref(), &[3, 0x01, 0x00, 0x00, 0x00, 2, 0x11, 0x22]);
    assert_eq!(seen[1].attrs().as_ref(), &[3, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 2]);
}

#[test]
fn test_second_request_is_busy() {
    let (npi, mut device) = connect(NpiConfig::default());

    let first = thread::spawn({
        let npi = npi.clone();
        move || npi.request(PingReq.sreq().unwrap())
    });
    let outstanding = device.next_frame(WAIT).expect("first request on the wire");

    let err = npi.request(VersionReq.sreq().unwrap()).unwrap_err();
    assert!(matches!(
        err,
        TransportError::Busy {
            outstanding_cmd0: 0x21,
            outstanding_cmd1: sys::cmd::PING_REQ,
        }
    ));
    // The busy request never reached the link
    assert!(device.next_frame(Duration::from_millis(50)).is_none());

    device.reply(&outstanding, &[0x01, 0x00]);
    let rsp = first.join().unwrap().unwrap();
    assert_eq!(rsp.attrs().as_ref(), &[0x01, 0x00]);

    npi.close();
}

#[test]
fn test_late_response_does_not_answer_next_request() {
    let config = NpiConfig {
        srsp_timeout: Duration::from_millis(100),
        ..NpiConfig::default()
    };
    let (npi, mut device) = connect(config);
    let before = metrics::snapshot();

    let err = thread::scope(|scope| {
        let pending = scope.spawn(|| npi.request(PingReq.sreq().unwrap()));
        let ping = device.next_frame(WAIT).expect("ping on the wire");
        let err = pending.join().unwrap().unwrap_err();
        device.reply(&ping, &[0xAA, 0xAA]);
        err
    });
    assert!(matches!(
        err,
        TransportError::Timeout {
            cmd1: sys::cmd::PING_REQ,
            ..
        }
    ));

    let version = thread::scope(|scope| {
        let pending = scope.spawn(|| {
            npi.request_timeout(VersionReq.sreq().unwrap(), WAIT)
        });
        let request = device.next_frame(WAIT).expect("version on the wire");
        device.reply(&request, &[2, 0, 7, 0, 0]);
        pending.join().unwrap()
    });
    let version = version.unwrap();
    assert_eq!(version.cmd1(), sys::cmd::VERSION_REQ);
    assert_eq!(version.attrs()[2], 7);

    let after = metrics::snapshot();
    assert!(after.srsp_timeouts > before.srsp_timeouts);
    assert!(after.srsp_discarded > before.srsp_discarded);

    npi.close();
}

#[test]
fn test_response_for_other_command_is_skipped() {
    let (npi, device) = connect(NpiConfig::default());
    let device = serve(device, |device, request| {
        let stray = MtFrame::build(CommandType::Srsp, Subsystem::Mac, 0x08, vec![0xE8]).unwrap();
        device.send(&stray);
        device.reply(request, &[0x34, 0x12]);
    });

    assert_eq!(MtSys::new(&npi).ping_req().unwrap(), 0x1234);

    npi.close();
    device.join().unwrap();
}

#[test]
fn test_rpc_error_rejects_request() {
    let (npi, device) = connect(NpiConfig::default());
    let device = serve(device, |device, request| {
        let error = MtFrame::new(
            0x60,
            0x00,
            vec![MtError::COMMAND_ID.as_u8(), request.cmd0(), request.cmd1()],
        )
        .unwrap();
        device.send(&error);
    });

    let err = MtSys::new(&npi).ping_req().unwrap_err();
    assert!(matches!(
        err,
        TransportError::Rejected {
            error: MtError::COMMAND_ID,
            cmd0: 0x21,
            cmd1: sys::cmd::PING_REQ,
        }
    ));

    npi.close();
    device.join().unwrap();
}

#[test]
fn test_corrupt_frame_is_dropped() {
    let (npi, device) = connect(NpiConfig::default());
    let before = metrics::snapshot();

    let lost = MtFrame::build(CommandType::Areq, Subsystem::Mac, 0x80, vec![0x01, 0x02]).unwrap();
    let mut corrupt = encode_uart(&lost).to_vec();
    if let Some(fcs) = corrupt.last_mut() {
        *fcs ^= 0xFF;
    }
    device.write_raw(&corrupt);
    device.indicate(Subsystem::Mac, 0x8E, &[0x00]);

    let delivered = npi.indications().recv_timeout(WAIT).unwrap();
    assert_eq!(delivered.cmd0(), 0x42);
    assert_eq!(delivered.cmd1(), 0x8E);
    assert_eq!(delivered.attrs().as_ref(), &[0x00]);
    assert!(npi.indications().try_recv().is_err());
    assert!(metrics::snapshot().fcs_errors > before.fcs_errors);

    npi.close();
}

#[test]
fn test_indication_split_across_reads() {
    let (npi, device) = connect(NpiConfig::default());

    let frame = MtFrame::build(CommandType::Areq, Subsystem::Sys, 0x80, vec![0, 2, 0, 1, 2, 3])
        .unwrap();
    let bytes = encode_uart(&frame);
    let (head, tail) = bytes.split_at(3);
    device.write_raw(&[0x00, 0x13]);
    device.write_raw(head);
    thread::sleep(Duration::from_millis(30));
    device.write_raw(tail);

    let delivered = npi.indications().recv_timeout(WAIT).unwrap();
    assert_eq!(delivered, frame);

    npi.close();
}

#[test]
fn test_full_indication_queue_drops_newest() {
    let config = NpiConfig {
        queue_depth: 2,
        ..NpiConfig::default()
    };
    let (npi, device) = connect(config);

    for reason in 0..4u8 {
        device.indicate(Subsystem::Mac, 0x80, &[reason]);
    }
    // The last frame answers a request, proving the reader got past the drops
    let ping = thread::scope(|scope| {
        let pending = scope.spawn(|| MtSys::new(&npi).ping_req());
        let mut device = device;
        let request = device.next_frame(WAIT).expect("ping on the wire");
        device.send(&srsp_for(&request, &[0x01, 0x00]));
        pending.join().unwrap()
    });
    assert_eq!(ping.unwrap(), 1);

    let queued: Vec<u8> = npi.indications().try_iter().map(|f| f.attrs()[0]).collect();
    assert_eq!(queued, vec![0, 1]);

    npi.close();
}

#[test]
fn test_close_fails_pending_and_later_requests() {
    let (npi, mut device) = connect(NpiConfig {
        srsp_timeout: Duration::from_secs(10),
        ..NpiConfig::default()
    });

    let pending = thread::spawn({
        let npi = npi.clone();
        move || npi.request(PingReq.sreq().unwrap())
    });
    device.next_frame(WAIT).expect("ping on the wire");

    npi.close();
    assert!(npi.is_closed());
    assert!(matches!(
        pending.join().unwrap(),
        Err(TransportError::WorkerStopped)
    ));
    assert!(matches!(
        npi.request(PingReq.sreq().unwrap()),
        Err(TransportError::Closed)
    ));
    // Idempotent
    npi.close();
}

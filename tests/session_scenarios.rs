//! End-to-end session scenarios against the scripted mock portal.
//!
//! The hardware test at the bottom needs a real portal.
//! Run with: cargo test --test session_scenarios -- --ignored --nocapture

use std::sync::Arc;

use parking_lot::Mutex;
use portal_driver::{
    CapabilitySet, DeviceIdentity, ErrorKind, HandshakePolicy, LightSide, PortalError, Rgb,
    Session, SessionConfig, SessionEvent, SessionState,
};
use portal_transport::mock::{MockDiscovery, MockPortal};
use portal_transport::protocol::cmd;

fn session(portal: &MockPortal, devices: usize, handshake: HandshakePolicy) -> Session {
    Session::new(
        Box::new(MockDiscovery::new(portal.clone(), devices)),
        SessionConfig {
            handshake,
            ..SessionConfig::default()
        },
    )
}

/// Record every event an observer sees
fn record(session: &mut Session) -> Arc<Mutex<Vec<SessionEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    session.add_observer(move |event| sink.lock().push(*event));
    events
}

#[test]
fn traptanium_connect_emits_one_notification() {
    let portal = MockPortal::new();
    portal.script_connect(DeviceIdentity::new(0x02, 0x1B));
    let mut session = session(&portal, 1, HandshakePolicy::default());
    let events = record(&mut session);

    session.connect().unwrap();

    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(session.capabilities(), CapabilitySet::DUAL_SIDE_LIGHTING);
    assert!(session.capabilities().supports_lighting);
    assert!(session.capabilities().supports_dual_side_lighting);
    assert_eq!(
        *events.lock(),
        vec![SessionEvent::StateChanged {
            state: SessionState::Connected
        }]
    );
    assert_eq!(portal.pending_responses(), 0);
}

#[test]
fn observer_sees_state_already_updated() {
    let portal = MockPortal::new();
    portal.script_connect(DeviceIdentity::new(0x01, 0x29));
    let mut session = session(&portal, 1, HandshakePolicy::default());
    let events = record(&mut session);

    session.connect().unwrap();
    session.disconnect();

    assert_eq!(
        *events.lock(),
        vec![
            SessionEvent::StateChanged {
                state: SessionState::Connected
            },
            SessionEvent::StateChanged {
                state: SessionState::Disconnected
            },
        ]
    );
}

#[test]
fn no_device_never_opens() {
    let portal = MockPortal::new();
    let mut session = session(&portal, 0, HandshakePolicy::default());
    let events = record(&mut session);

    let err = session.connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoDeviceFound);
    assert_eq!(portal.open_count(), 0);
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(events.lock().is_empty());
}

#[test]
fn two_devices_are_ambiguous() {
    let portal = MockPortal::new();
    portal.script_connect(DeviceIdentity::new(0x02, 0x1B));
    let mut session = session(&portal, 2, HandshakePolicy::default());

    let err = session.connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AmbiguousDevice);
    assert_eq!(
        err.message(),
        "2 portals were found. Please make sure only one portal is connected."
    );
    assert_eq!(portal.open_count(), 0);
    assert!(portal.written().is_empty());
}

#[test]
fn write_failure_tears_down_session() {
    let portal = MockPortal::new();
    portal.script_connect(DeviceIdentity::new(0x02, 0x1B));
    let mut session = session(&portal, 1, HandshakePolicy::default());
    session.connect().unwrap();
    let events = record(&mut session);

    portal.fail_writes(true);
    let err = session
        .set_color_extended(LightSide::Right, Rgb::WHITE, 500)
        .unwrap_err();

    assert!(matches!(err, PortalError::WriteFailed(_)));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(session.identity().is_zero());
    assert_eq!(session.capabilities(), CapabilitySet::default());
    assert!(!portal.is_open());
    assert_eq!(
        *events.lock(),
        vec![SessionEvent::StateChanged {
            state: SessionState::Disconnected
        }]
    );

    // Later commands are no-ops
    portal.fail_writes(false);
    session.set_color(Rgb::RED).unwrap();
    assert_eq!(portal.written_opcodes(), vec![cmd::READY, cmd::ACTIVATE]);
}

#[test]
fn handshake_skips_non_ack_reports() {
    let portal = MockPortal::new();
    portal.push_response(&[0x00]);
    portal.push_response(&[b'Q', 0x01, 0x00]);
    portal.respond_ready(DeviceIdentity::new(0x01, 0x40));
    portal.push_response(&[b'R', 0x01, 0x40]);
    portal.push_response(&[b'R', 0x01, 0x40]);
    portal.respond_activate();
    let mut session = session(&portal, 1, HandshakePolicy::attempts(10));

    session.connect().unwrap();
    assert_eq!(
        portal.written_opcodes(),
        vec![
            cmd::READY,
            cmd::READY,
            cmd::READY,
            cmd::ACTIVATE,
            cmd::ACTIVATE,
            cmd::ACTIVATE
        ]
    );
    assert_eq!(session.identity(), DeviceIdentity::new(0x01, 0x40));
    assert_eq!(session.capabilities(), CapabilitySet::LIGHTING);
}

#[test]
fn silent_portal_times_out() {
    let portal = MockPortal::new();
    let mut session = session(&portal, 1, HandshakePolicy::attempts(3));
    let events = record(&mut session);

    let err = session.connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HandshakeTimeout);
    assert_eq!(portal.written_opcodes(), vec![cmd::READY; 3]);
    assert!(!portal.is_open());
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(events.lock().is_empty());
}

#[test]
fn open_failure_reports_path() {
    let portal = MockPortal::new();
    let mut session = Session::new(
        Box::new(MockDiscovery::new(portal.clone(), 1).fail_open()),
        SessionConfig::default(),
    );

    match session.connect() {
        Err(PortalError::OpenFailed { path, .. }) => assert_eq!(path, "mock:0"),
        other => panic!("expected OpenFailed, got {other:?}"),
    }
    assert!(!session.is_connected());
}

#[test]
fn disconnect_is_idempotent() {
    let portal = MockPortal::new();
    portal.script_connect(DeviceIdentity::new(0x02, 0x18));
    let mut session = session(&portal, 1, HandshakePolicy::default());
    session.connect().unwrap();
    let events = record(&mut session);

    session.disconnect();
    session.disconnect();

    assert_eq!(events.lock().len(), 1);
    assert_eq!(
        portal
            .written_opcodes()
            .iter()
            .filter(|&&op| op == cmd::ACTIVATE)
            .count(),
        2 // handshake + one deactivate
    );
}

#[test]
fn commands_while_disconnected_do_no_io() {
    let portal = MockPortal::new();
    let mut session = session(&portal, 1, HandshakePolicy::default());

    session.set_color(Rgb::new(10, 20, 30)).unwrap();
    session
        .set_color_extended(LightSide::Left, Rgb::BLUE, 0)
        .unwrap();
    session.deactivate().unwrap();
    assert!(!session.check_response(cmd::ACTIVATE).unwrap());
    session.disconnect();

    assert_eq!(portal.open_count(), 0);
    assert!(portal.written().is_empty());
    assert_eq!(portal.read_count(), 0);
}

#[test]
fn subscriber_on_another_thread() {
    let portal = MockPortal::new();
    portal.script_connect(DeviceIdentity::new(0x02, 0x1B));
    let mut session = session(&portal, 1, HandshakePolicy::default());
    let mut rx = session.subscribe();

    let handle = std::thread::spawn(move || rx.blocking_recv());
    session.connect().unwrap();

    assert_eq!(
        handle.join().unwrap().unwrap(),
        SessionEvent::StateChanged {
            state: SessionState::Connected
        }
    );
}

#[test]
#[ignore] // requires hardware
fn hardware_connect_and_light() {
    let mut session = Session::new(
        Box::new(portal_driver::HidDiscovery::new()),
        SessionConfig::default(),
    );
    session
        .connect()
        .expect("No portal found - plug in exactly one portal");
    println!(
        "Connected: {} ({}) capabilities: {}",
        session.model(),
        session.identity(),
        session.capabilities()
    );

    session.set_color(Rgb::GREEN).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(500));
    if session.capabilities().supports_dual_side_lighting {
        session
            .set_color_extended(LightSide::Left, Rgb::RED, 500)
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(700));
    }
    session.disconnect();
    assert_eq!(session.state(), SessionState::Disconnected);
}

//! Integration tests for the protocol session state machine.

use ble_led_core::{
    AttError, CharacteristicId, ColorCommand, Command, CommandHandler, DeviceAddress,
    PowerCommand, ProtocolSession, STRIP_SERVICE, SessionEvent, SessionOutcome, SessionState,
    WriteResponse,
};

const NAME: &str = "LedsPhilipp";
const ADDRESS: DeviceAddress = DeviceAddress::random_static([0xC1, 0x02, 0x03, 0x04, 0x05, 0x06]);

#[derive(Default)]
struct Recorder {
    commands: Vec<Command>,
}

impl CommandHandler for Recorder {
    fn handle_command(&mut self, command: Command) {
        self.commands.push(command);
    }
}

fn connected_session(recorder: &mut Recorder) -> ProtocolSession {
    let mut session = ProtocolSession::new(NAME, 0, &STRIP_SERVICE);
    session.handle(SessionEvent::HostSynced { address: ADDRESS }, recorder);
    session.handle(SessionEvent::Connected { conn: 1 }, recorder);
    assert_eq!(session.state(), SessionState::Connected { conn: 1 });
    session
}

fn write(characteristic: CharacteristicId, payload: &[u8]) -> SessionEvent<'_> {
    SessionEvent::Write {
        characteristic,
        payload,
    }
}

// -----------------------------------------------------------------------------
// Lifecycle
// -----------------------------------------------------------------------------

#[test]
fn sync_starts_advertising_with_own_address() {
    let mut session = ProtocolSession::new(NAME, 0, &STRIP_SERVICE);
    assert_eq!(session.state(), SessionState::Idle);

    let outcome = session.handle(
        SessionEvent::HostSynced { address: ADDRESS },
        &mut Recorder::default(),
    );

    let SessionOutcome::Advertise(params) = outcome else {
        panic!("expected advertising, got {outcome:?}");
    };
    assert_eq!(params.address, ADDRESS);
    assert_eq!(params.name, NAME);
    assert_eq!(params.flags, 0x06);
    assert_eq!(params.duration_ms, None);
    assert_eq!(session.state(), SessionState::Advertising);
}

#[test]
fn disconnect_returns_to_advertising() {
    let mut recorder = Recorder::default();
    let mut session = connected_session(&mut recorder);

    let outcome = session.handle(SessionEvent::Disconnected { reason: 0x13 }, &mut recorder);

    assert!(matches!(outcome, SessionOutcome::Advertise(p) if p.address == ADDRESS));
    assert_eq!(session.state(), SessionState::Advertising);
}

#[test]
fn failed_connect_and_completed_advertising_restart_advertising() {
    let mut recorder = Recorder::default();
    let mut session = ProtocolSession::new(NAME, 0, &STRIP_SERVICE);
    session.handle(SessionEvent::HostSynced { address: ADDRESS }, &mut recorder);

    for event in [
        SessionEvent::ConnectFailed { status: 2 },
        SessionEvent::AdvertisingComplete,
    ] {
        let outcome = session.handle(event, &mut recorder);
        assert!(matches!(outcome, SessionOutcome::Advertise(_)));
        assert_eq!(session.state(), SessionState::Advertising);
    }
}

#[test]
fn second_connection_is_ignored() {
    let mut recorder = Recorder::default();
    let mut session = connected_session(&mut recorder);
    assert_eq!(
        session.handle(SessionEvent::Connected { conn: 2 }, &mut recorder),
        SessionOutcome::Ignored
    );
    assert_eq!(session.state(), SessionState::Connected { conn: 1 });
}

#[test]
fn host_reset_waits_for_next_sync() {
    let mut recorder = Recorder::default();
    let mut session = connected_session(&mut recorder);

    session.handle(SessionEvent::HostReset { reason: 7 }, &mut recorder);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.address(), Some(ADDRESS));

    let outcome = session.handle(SessionEvent::HostSynced { address: ADDRESS }, &mut recorder);
    assert!(matches!(outcome, SessionOutcome::Advertise(_)));
}

#[test]
fn sync_while_connected_keeps_the_link() {
    let mut recorder = Recorder::default();
    let mut session = connected_session(&mut recorder);

    assert_eq!(
        session.handle(SessionEvent::HostSynced { address: ADDRESS }, &mut recorder),
        SessionOutcome::Ignored
    );
    assert_eq!(session.state(), SessionState::Connected { conn: 1 });
    assert_eq!(
        session.handle(write(CharacteristicId::Power, b"1"), &mut recorder),
        SessionOutcome::Respond(WriteResponse::Accepted)
    );
    assert_eq!(recorder.commands, [Command::Power(PowerCommand::ON)]);
}

#[test]
fn repeated_sync_while_advertising_is_ignored() {
    let mut recorder = Recorder::default();
    let mut session = ProtocolSession::new(NAME, 0, &STRIP_SERVICE);
    session.handle(SessionEvent::HostSynced { address: ADDRESS }, &mut recorder);

    assert_eq!(
        session.handle(SessionEvent::HostSynced { address: ADDRESS }, &mut recorder),
        SessionOutcome::Ignored
    );
    assert_eq!(session.state(), SessionState::Advertising);
}

#[test]
fn subscribe_and_mtu_change_nothing() {
    let mut recorder = Recorder::default();
    let mut session = connected_session(&mut recorder);
    for event in [
        SessionEvent::Subscribe { conn: 1 },
        SessionEvent::MtuUpdated { conn: 1, mtu: 247 },
    ] {
        assert_eq!(session.handle(event, &mut recorder), SessionOutcome::Continue);
    }
    assert_eq!(session.state(), SessionState::Connected { conn: 1 });
}

// -----------------------------------------------------------------------------
// Writes
// -----------------------------------------------------------------------------

#[test]
fn valid_writes_are_forwarded_in_order() {
    let mut recorder = Recorder::default();
    let mut session = connected_session(&mut recorder);

    for event in [
        write(CharacteristicId::Color, b"255,0,128"),
        write(CharacteristicId::Power, b"0"),
    ] {
        assert_eq!(
            session.handle(event, &mut recorder),
            SessionOutcome::Respond(WriteResponse::Accepted)
        );
    }

    assert_eq!(
        recorder.commands,
        [
            Command::Color(ColorCommand::new(255, 0, 128)),
            Command::Power(PowerCommand::OFF),
        ]
    );
}

#[test]
fn malformed_color_is_acknowledged_and_dropped() {
    let mut recorder = Recorder::default();
    let mut session = connected_session(&mut recorder);

    let outcome = session.handle(write(CharacteristicId::Color, b"10,20"), &mut recorder);

    assert_eq!(outcome, SessionOutcome::Respond(WriteResponse::Accepted));
    assert!(recorder.commands.is_empty());
    assert_eq!(session.state(), SessionState::Connected { conn: 1 });
}

#[test]
fn oversized_write_is_rejected_without_disconnect() {
    let mut recorder = Recorder::default();
    let mut session = connected_session(&mut recorder);

    let outcome = session.handle(
        write(CharacteristicId::Color, b"255,255,255"),
        &mut recorder,
    );

    assert_eq!(
        outcome,
        SessionOutcome::Respond(WriteResponse::Rejected(
            AttError::InvalidAttributeValueLength
        ))
    );
    assert!(recorder.commands.is_empty());
    assert_eq!(session.state(), SessionState::Connected { conn: 1 });
}

#[test]
fn unsupported_operation_is_unlikely_error() {
    let mut recorder = Recorder::default();
    let mut session = connected_session(&mut recorder);
    assert_eq!(
        session.handle(SessionEvent::UnsupportedOperation, &mut recorder),
        SessionOutcome::Respond(WriteResponse::Rejected(AttError::Unlikely))
    );
}

#[test]
fn writes_after_disconnect_are_ignored() {
    let mut recorder = Recorder::default();
    let mut session = connected_session(&mut recorder);
    session.handle(SessionEvent::Disconnected { reason: 0x08 }, &mut recorder);

    assert_eq!(
        session.handle(write(CharacteristicId::Power, b"1"), &mut recorder),
        SessionOutcome::Ignored
    );
    assert!(recorder.commands.is_empty());
}

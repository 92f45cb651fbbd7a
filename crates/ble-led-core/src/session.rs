//! Protocol session
//!
//! Connection lifecycle of the strip as a plain state machine. The BLE
//! transport turns its callbacks into [`SessionEvent`]s, the session updates
//! its state and tells the transport what to do next through a
//! [`SessionOutcome`]. Decoded writes are handed to a [`CommandHandler`]
//! before the outcome is returned.
//!
//! ```text
//! Idle --HostSynced--> Advertising --Connected--> Connected
//!                          ^  |                       |
//!                          +--+ ConnectFailed         |
//!                          +---- Disconnected --------+
//! any --HostReset--> Idle
//! ```

use crate::{
    advertising::{AdvertisingParams, DeviceAddress},
    command::Command,
    gatt::{AttError, CharacteristicId, GattService, WriteResponse},
};

/// Handle assigned to a connection by the transport
pub type ConnHandle = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the host to sync
    Idle,
    Advertising,
    Connected { conn: ConnHandle },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent<'a> {
    /// Host is ready, own address resolved
    HostSynced { address: DeviceAddress },
    /// Host lost sync with the controller
    HostReset { reason: i32 },
    Connected { conn: ConnHandle },
    ConnectFailed { status: i32 },
    Disconnected { reason: i32 },
    /// Advertising stopped without a connection
    AdvertisingComplete,
    Write {
        characteristic: CharacteristicId,
        payload: &'a [u8],
    },
    /// Access the service does not support, for example a read
    UnsupportedOperation,
    Subscribe { conn: ConnHandle },
    MtuUpdated { conn: ConnHandle, mtu: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// (Re)start advertising with these parameters
    Advertise(AdvertisingParams),
    /// Answer the pending write with this status
    Respond(WriteResponse),
    /// Event did not apply to the current state
    Ignored,
    /// Nothing for the transport to do
    Continue,
}

/// Receiver of decoded commands
pub trait CommandHandler {
    fn handle_command(&mut self, command: Command);
}

pub struct ProtocolSession {
    state: SessionState,
    address: Option<DeviceAddress>,
    name: &'static str,
    tx_power_dbm: i8,
    service: &'static GattService,
}

impl ProtocolSession {
    pub const fn new(name: &'static str, tx_power_dbm: i8, service: &'static GattService) -> Self {
        Self {
            state: SessionState::Idle,
            address: None,
            name,
            tx_power_dbm,
            service,
        }
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn address(&self) -> Option<DeviceAddress> {
        self.address
    }

    /// Advertising parameters for the synced address
    pub fn advertising_params(&self) -> Option<AdvertisingParams> {
        self.address
            .map(|address| AdvertisingParams::connectable(self.name, self.tx_power_dbm, address))
    }

    pub fn handle<H: CommandHandler>(
        &mut self,
        event: SessionEvent<'_>,
        handler: &mut H,
    ) -> SessionOutcome {
        match event {
            SessionEvent::HostSynced { address } => match self.state {
                SessionState::Idle => {
                    log::info!("session: device address {}", address);
                    self.address = Some(address);
                    self.advertise()
                }
                _ => SessionOutcome::Ignored,
            },
            SessionEvent::HostReset { reason } => {
                log::error!("session: resetting state; reason={}", reason);
                self.state = SessionState::Idle;
                SessionOutcome::Continue
            }
            SessionEvent::Connected { conn } => match self.state {
                SessionState::Advertising => {
                    log::info!("session: connection established; conn={}", conn);
                    self.state = SessionState::Connected { conn };
                    SessionOutcome::Continue
                }
                _ => SessionOutcome::Ignored,
            },
            SessionEvent::ConnectFailed { status } => {
                log::info!("session: connection failed; status={}", status);
                self.readvertise()
            }
            SessionEvent::Disconnected { reason } => match self.state {
                SessionState::Connected { .. } => {
                    log::info!("session: disconnect; reason={}", reason);
                    self.advertise()
                }
                _ => SessionOutcome::Ignored,
            },
            SessionEvent::AdvertisingComplete => {
                log::info!("session: advertising complete");
                self.readvertise()
            }
            SessionEvent::Write {
                characteristic,
                payload,
            } => self.write(characteristic, payload, handler),
            SessionEvent::UnsupportedOperation => match self.state {
                SessionState::Connected { .. } => {
                    SessionOutcome::Respond(WriteResponse::Rejected(AttError::Unlikely))
                }
                _ => SessionOutcome::Ignored,
            },
            SessionEvent::Subscribe { conn } => {
                log::info!("session: subscribe; conn={}", conn);
                SessionOutcome::Continue
            }
            SessionEvent::MtuUpdated { conn, mtu } => {
                log::info!("session: mtu update; conn={} mtu={}", conn, mtu);
                SessionOutcome::Continue
            }
        }
    }

    fn write<H: CommandHandler>(
        &mut self,
        characteristic: CharacteristicId,
        payload: &[u8],
        handler: &mut H,
    ) -> SessionOutcome {
        if !matches!(self.state, SessionState::Connected { .. }) {
            return SessionOutcome::Ignored;
        }
        let Some(descriptor) = self.service.characteristic(characteristic) else {
            return SessionOutcome::Respond(WriteResponse::Rejected(AttError::Unlikely));
        };

        let decoded = (descriptor.decode)(payload);
        match decoded {
            Ok(command) => handler.handle_command(command),
            Err(err) => log::warn!("session: dropped {} write: {:?}", descriptor.name, err),
        }
        SessionOutcome::Respond(WriteResponse::for_decode(&decoded))
    }

    /// Restart advertising while not connected
    fn readvertise(&mut self) -> SessionOutcome {
        match self.state {
            SessionState::Advertising => self.advertise(),
            _ => SessionOutcome::Ignored,
        }
    }

    fn advertise(&mut self) -> SessionOutcome {
        match self.advertising_params() {
            Some(params) => {
                self.state = SessionState::Advertising;
                SessionOutcome::Advertise(params)
            }
            None => {
                log::warn!("session: no address, cannot advertise");
                self.state = SessionState::Idle;
                SessionOutcome::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gatt::STRIP_SERVICE;

    #[derive(Default)]
    struct Sink(Option<Command>);

    impl CommandHandler for Sink {
        fn handle_command(&mut self, command: Command) {
            self.0 = Some(command);
        }
    }

    #[test]
    fn writes_are_ignored_until_connected() {
        let mut session = ProtocolSession::new("strip", 0, &STRIP_SERVICE);
        let mut sink = Sink::default();
        let outcome = session.handle(
            SessionEvent::Write {
                characteristic: CharacteristicId::Power,
                payload: b"1",
            },
            &mut sink,
        );
        assert_eq!(outcome, SessionOutcome::Ignored);
        assert_eq!(sink.0, None);
    }

    #[test]
    fn cannot_advertise_before_sync() {
        let mut session = ProtocolSession::new("strip", 0, &STRIP_SERVICE);
        let outcome = session.handle(SessionEvent::AdvertisingComplete, &mut Sink::default());
        assert_eq!(outcome, SessionOutcome::Ignored);
        assert_eq!(session.state(), SessionState::Idle);
    }
}

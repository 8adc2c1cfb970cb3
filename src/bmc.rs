use std::{net::SocketAddr, sync::Arc};

use crate::{
    connection::{rmcp, Transport},
    dispatch::{Context, Dispatcher, Request},
    machine::MachineRegistry,
    session::SessionStore,
    Config, DecodeError,
};

/// A simulated BMC endpoint: decodes incoming datagrams, dispatches them to
/// command handlers and answers through a [`Transport`].
///
/// A `Bmc` is shared between all datagram handlers. Every datagram can be
/// handled on its own thread; the only shared mutable state is the
/// [`SessionStore`].
pub struct Bmc {
    config: Config,
    dispatcher: Dispatcher,
    sessions: SessionStore,
    machines: Arc<dyn MachineRegistry>,
}

impl Bmc {
    pub fn new(config: Config, machines: Arc<dyn MachineRegistry>) -> Self {
        Self::with_dispatcher(config, Dispatcher::default(), machines)
    }

    pub fn with_dispatcher(
        config: Config,
        dispatcher: Dispatcher,
        machines: Arc<dyn MachineRegistry>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            sessions: SessionStore::new(),
            machines,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one datagram received from `from` on `transport`.
    ///
    /// Datagrams that do not decode, that are not IPMI or that are IPMI
    /// responses are logged and dropped.
    pub fn handle_datagram(&self, transport: &dyn Transport, from: SocketAddr, data: &[u8]) {
        let packet = match rmcp::decode_packet(data) {
            Ok(decoded) => decoded,
            Err(DecodeError::NotIpmi(class)) => {
                log::debug!("Ignoring non-IPMI RMCP datagram from {from} ({class:?})");
                return;
            }
            Err(e) => {
                log::warn!("Dropping malformed datagram from {from}: {e:?}");
                return;
            }
        };
        let (wrapper, message) = (&packet.wrapper, &packet.message);

        if message.is_response() {
            log::debug!(
                "Ignoring {} response 0x{:02X} from {from}",
                message.netfn(),
                message.cmd()
            );
            return;
        }

        log::trace!(
            "Request from {from}: session 0x{:08X}, seq {}, {} command 0x{:02X}",
            wrapper.session_id,
            wrapper.sequence_number,
            message.netfn(),
            message.cmd()
        );

        let ctx = Context {
            transport,
            sessions: &self.sessions,
            machines: &*self.machines,
            config: &self.config,
            dispatcher: &self.dispatcher,
        };

        let request = Request {
            from,
            wrapper,
            message,
            payload: packet.payload,
        };

        self.dispatcher.dispatch(&ctx, &request);
    }
}

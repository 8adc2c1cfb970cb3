//! Routing of decoded requests to command handlers.
//!
//! Dispatch happens in two stateless steps: the NetFn/command pair selects a
//! [`CommandHandler`], and commands that carry a parameter selector (such as
//! Set System Boot Options) use a second table to pick a sub-handler. Both
//! tables are built once, before traffic is accepted, and are read-only
//! afterwards.

use std::{collections::HashMap, net::SocketAddr};

use crate::{
    chassis::{
        self,
        boot_options::{BootOptionHandler, BootOptionParameter, BootOptionTable},
    },
    connection::{rmcp::SessionWrapper, CompletionCode, Message, NetFn, Transport},
    machine::MachineRegistry,
    response,
    session::SessionStore,
    Config,
};

/// A decoded request and where it came from.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub from: SocketAddr,
    pub wrapper: &'a SessionWrapper,
    pub message: &'a Message,
    /// The message bytes as received.
    pub payload: &'a [u8],
}

/// Everything a handler may touch while processing one request.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub transport: &'a dyn Transport,
    pub sessions: &'a SessionStore,
    pub machines: &'a dyn MachineRegistry,
    pub config: &'a Config,
    pub dispatcher: &'a Dispatcher,
}

impl Context<'_> {
    /// Answer `request`. See [`response::respond`].
    pub fn respond(&self, request: &Request<'_>, completion_code: CompletionCode, data: &[u8]) {
        response::respond(self, request, completion_code, data)
    }
}

pub type CommandHandler = fn(&Context<'_>, &Request<'_>);

pub struct Dispatcher {
    commands: HashMap<(NetFn, u8), CommandHandler>,
    boot_options: BootOptionTable,
}

impl Default for Dispatcher {
    /// All commands implemented by this crate, with their default
    /// boot option handlers.
    fn default() -> Self {
        chassis::register(Dispatcher::builder()).build()
    }
}

impl Dispatcher {
    /// An empty dispatcher: no commands, and only the unsupported handler
    /// for boot options.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder {
            commands: HashMap::new(),
            boot_options: BootOptionTable::unsupported_only(),
        }
    }

    pub fn boot_options(&self) -> &BootOptionTable {
        &self.boot_options
    }

    pub fn handler(&self, netfn: NetFn, cmd: u8) -> Option<CommandHandler> {
        self.commands.get(&(netfn, cmd)).copied()
    }

    pub fn dispatch(&self, ctx: &Context<'_>, request: &Request<'_>) {
        let (netfn, cmd) = (request.message.netfn(), request.message.cmd());

        match self.handler(netfn, cmd) {
            Some(handler) => {
                log::trace!("Dispatching {netfn} command 0x{cmd:02X}");
                handler(ctx, request)
            }
            None => {
                log::warn!("Unsupported {netfn} command 0x{cmd:02X}");
                ctx.respond(request, CompletionCode::InvalidCommand, &[]);
            }
        }
    }
}

pub struct DispatcherBuilder {
    commands: HashMap<(NetFn, u8), CommandHandler>,
    boot_options: BootOptionTable,
}

impl DispatcherBuilder {
    /// Route requests for `netfn`/`cmd` to `handler`, replacing any
    /// handler registered earlier.
    pub fn command(mut self, netfn: NetFn, cmd: u8, handler: CommandHandler) -> Self {
        self.commands.insert((netfn, cmd), handler);
        self
    }

    /// Route Set System Boot Options requests for `parameter` to `handler`.
    ///
    /// Parameters outside of the defined range always go to the
    /// unsupported handler and cannot be registered.
    pub fn boot_option(mut self, parameter: BootOptionParameter, handler: BootOptionHandler) -> Self {
        if !self.boot_options.set(parameter, handler) {
            log::warn!("Cannot register a handler for boot option {parameter}");
        }
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            commands: self.commands,
            boot_options: self.boot_options,
        }
    }
}

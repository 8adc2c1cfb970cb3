//! The parameters of the Set System Boot Options command.
//!
//! Reference: IPMI 2.0, Table 28-14.

pub mod boot_flags;
pub mod boot_info_ack;
pub mod set_in_progress;

use crate::{
    connection::CompletionCode,
    dispatch::{Context, Request},
};

/// The number of parameters with a slot in the [`BootOptionTable`].
const DEFINED_PARAMETERS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOptionParameter {
    SetInProgress,
    ServicePartitionSelector,
    ServicePartitionScan,
    BmcBootFlagValidBitClearing,
    BootInfoAcknowledge,
    BootFlags,
    BootInitiatorInfo,
    BootInitiatorMailbox,
    /// A parameter this BMC does not know about (OEM parameters, or
    /// parameters from later IPMI revisions).
    Unknown(u8),
}

impl From<u8> for BootOptionParameter {
    /// Only the lower 7 bits of `value` are used.
    fn from(value: u8) -> Self {
        match value & 0x7F {
            0 => Self::SetInProgress,
            1 => Self::ServicePartitionSelector,
            2 => Self::ServicePartitionScan,
            3 => Self::BmcBootFlagValidBitClearing,
            4 => Self::BootInfoAcknowledge,
            5 => Self::BootFlags,
            6 => Self::BootInitiatorInfo,
            7 => Self::BootInitiatorMailbox,
            v => Self::Unknown(v),
        }
    }
}

impl BootOptionParameter {
    pub fn value(&self) -> u8 {
        match self {
            Self::SetInProgress => 0,
            Self::ServicePartitionSelector => 1,
            Self::ServicePartitionScan => 2,
            Self::BmcBootFlagValidBitClearing => 3,
            Self::BootInfoAcknowledge => 4,
            Self::BootFlags => 5,
            Self::BootInitiatorInfo => 6,
            Self::BootInitiatorMailbox => 7,
            Self::Unknown(v) => *v,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SetInProgress => "Set In Progress",
            Self::ServicePartitionSelector => "Service Partition Selector",
            Self::ServicePartitionScan => "Service Partition Scan",
            Self::BmcBootFlagValidBitClearing => "BMC Boot Flag Valid Bit Clearing",
            Self::BootInfoAcknowledge => "Boot Info Acknowledge",
            Self::BootFlags => "Boot Flags",
            Self::BootInitiatorInfo => "Boot Initiator Info",
            Self::BootInitiatorMailbox => "Boot Initiator Mailbox",
            Self::Unknown(_) => "Unknown",
        }
    }

    fn slot(&self) -> Option<usize> {
        match self {
            Self::Unknown(_) => None,
            other => Some(other.value() as usize),
        }
    }
}

impl core::fmt::Display for BootOptionParameter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unknown(v) => write!(f, "Unknown (0x{v:02X})"),
            known => write!(f, "{}", known.name()),
        }
    }
}

/// The parameter selector byte of a Set System Boot Options request and the
/// parameter data that follows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSelector<'a> {
    /// Bit 7: mark the parameter as invalid/locked.
    pub mark_invalid: bool,
    pub parameter: BootOptionParameter,
    pub data: &'a [u8],
}

impl<'a> ParameterSelector<'a> {
    /// Parse the request data. A missing selector byte reads as zero.
    pub fn from_data(data: &'a [u8]) -> Self {
        let (selector, data) = match data.split_first() {
            Some((selector, rest)) => (*selector, rest),
            None => {
                log::warn!("Set System Boot Options request without parameter selector");
                (0, data)
            }
        };

        Self {
            mark_invalid: selector & 0x80 == 0x80,
            parameter: BootOptionParameter::from(selector),
            data,
        }
    }
}

/// Copy `data` into a zeroed array of `N` bytes, so that a truncated
/// parameter reads as if its missing bytes were zero.
pub(crate) fn zero_extended<const N: usize>(data: &[u8]) -> [u8; N] {
    let mut bytes = [0u8; N];
    let len = data.len().min(N);
    bytes[..len].copy_from_slice(&data[..len]);

    if data.len() < N {
        log::debug!("Boot option parameter truncated: {} of {N} bytes", data.len());
    }

    bytes
}

pub type BootOptionHandler = fn(&Context<'_>, &Request<'_>, &ParameterSelector<'_>);

/// The parameter selector to handler table.
#[derive(Clone)]
pub struct BootOptionTable {
    handlers: [BootOptionHandler; DEFINED_PARAMETERS],
    unsupported: BootOptionHandler,
}

impl BootOptionTable {
    /// A table routing every parameter to [`unsupported`].
    pub fn unsupported_only() -> Self {
        Self {
            handlers: [unsupported; DEFINED_PARAMETERS],
            unsupported,
        }
    }

    /// Set the handler for `parameter`. Returns `false` if `parameter` has no
    /// slot in the table.
    pub fn set(&mut self, parameter: BootOptionParameter, handler: BootOptionHandler) -> bool {
        match parameter.slot() {
            Some(slot) => {
                self.handlers[slot] = handler;
                true
            }
            None => false,
        }
    }

    pub fn handler(&self, parameter: BootOptionParameter) -> BootOptionHandler {
        parameter
            .slot()
            .map(|slot| self.handlers[slot])
            .unwrap_or(self.unsupported)
    }

    pub fn dispatch(&self, ctx: &Context<'_>, request: &Request<'_>, selector: &ParameterSelector<'_>) {
        (self.handler(selector.parameter))(ctx, request, selector)
    }
}

/// The handler for parameters the simulator does not implement: acknowledge
/// and do nothing.
pub fn unsupported(ctx: &Context<'_>, request: &Request<'_>, selector: &ParameterSelector<'_>) {
    log::info!(
        "Boot option {} is not supported currently",
        selector.parameter
    );

    ctx.respond(request, CompletionCode::Success, &[]);
}

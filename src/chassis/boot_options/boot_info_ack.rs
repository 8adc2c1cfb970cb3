use crate::{
    connection::CompletionCode,
    dispatch::{Context, Request},
    fmt::{LogItem, Loggable, Logger},
};

use super::{zero_extended, ParameterSelector};

bitflags::bitflags! {
    /// The bits of the acknowledge byte that a write may change.
    pub struct WriteMask: u8 {
        const BIT_7 = 1 << 7;
        const BIT_6 = 1 << 6;
        const BIT_5 = 1 << 5;
        const BIT_4 = 1 << 4;
        const BIT_3 = 1 << 3;
        const BIT_2 = 1 << 2;
        const BIT_1 = 1 << 1;
        const BIT_0 = 1 << 0;
    }
}

bitflags::bitflags! {
    /// The boot initiators that have handled the boot info.
    pub struct BootInfoAck: u8 {
        const OEM = 1 << 4;
        const SMS = 1 << 3;
        const OS_SERVICE_PARTITION = 1 << 2;
        const OS_LOADER = 1 << 1;
        const BIOS_POST = 1 << 0;
    }
}

impl BootInfoAck {
    fn names(&self) -> Vec<&'static str> {
        [
            (Self::BIOS_POST, "BIOS/POST"),
            (Self::OS_LOADER, "OS loader"),
            (Self::OS_SERVICE_PARTITION, "OS/service partition"),
            (Self::SMS, "SMS"),
            (Self::OEM, "OEM"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect()
    }
}

/// Parameter 4: boot info acknowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootInfoAcknowledge {
    pub write_mask: WriteMask,
    pub acknowledged: BootInfoAck,
    /// The acknowledge byte as received, including reserved bits.
    raw_ack: u8,
}

impl BootInfoAcknowledge {
    pub fn new(write_mask: WriteMask, acknowledged: BootInfoAck) -> Self {
        Self {
            write_mask,
            acknowledged,
            raw_ack: acknowledged.bits(),
        }
    }

    /// Missing bytes read as zero.
    pub fn from_data(data: &[u8]) -> Self {
        let [mask, ack] = zero_extended::<2>(data);

        Self {
            write_mask: WriteMask::from_bits_truncate(mask),
            acknowledged: BootInfoAck::from_bits_truncate(ack),
            raw_ack: ack,
        }
    }

    pub fn to_bytes(&self) -> [u8; 2] {
        [self.write_mask.bits(), self.raw_ack]
    }
}

impl Loggable for BootInfoAcknowledge {
    fn as_log(&self) -> Vec<LogItem> {
        let writable: Vec<_> = (0..8u8)
            .filter(|bit| self.write_mask.bits() & (1 << *bit) != 0)
            .map(|bit| bit.to_string())
            .collect();

        let handled = self.acknowledged.names();

        log_vec![
            (0, "Boot info acknowledge"),
            (1, "Writable bits", if writable.is_empty() { "none".into() } else { writable.join(", ") }),
            (1, "Handled by", if handled.is_empty() { "nobody".into() } else { handled.join(", ") })
        ]
    }
}

/// Log the acknowledgement. The simulated BMC keeps no boot info state.
pub fn handle(ctx: &Context<'_>, request: &Request<'_>, selector: &ParameterSelector<'_>) {
    let ack = BootInfoAcknowledge::from_data(selector.data);

    Logger::log(&ctx.config.parameter_log, &ack);

    ctx.respond(request, CompletionCode::Success, &[]);
}

//! Chassis network function commands.

pub mod boot_options;

use crate::{
    connection::NetFn,
    dispatch::{Context, DispatcherBuilder, Request},
};

use boot_options::{BootOptionParameter, ParameterSelector};

pub const SET_SYSTEM_BOOT_OPTIONS: u8 = 0x08;

/// Register the chassis commands and the boot option parameters this crate
/// implements.
pub fn register(builder: DispatcherBuilder) -> DispatcherBuilder {
    builder
        .command(
            NetFn::Chassis,
            SET_SYSTEM_BOOT_OPTIONS,
            set_system_boot_options,
        )
        .boot_option(
            BootOptionParameter::SetInProgress,
            boot_options::set_in_progress::handle,
        )
        .boot_option(
            BootOptionParameter::BootInfoAcknowledge,
            boot_options::boot_info_ack::handle,
        )
        .boot_option(
            BootOptionParameter::BootFlags,
            boot_options::boot_flags::handle,
        )
}

fn set_system_boot_options(ctx: &Context<'_>, request: &Request<'_>) {
    let selector = ParameterSelector::from_data(request.message.data());

    log::debug!(
        "Set System Boot Options: {} ({} bytes{})",
        selector.parameter,
        selector.data.len(),
        if selector.mark_invalid {
            ", marked invalid"
        } else {
            ""
        }
    );

    ctx.dispatcher
        .boot_options()
        .dispatch(ctx, request, &selector);
}

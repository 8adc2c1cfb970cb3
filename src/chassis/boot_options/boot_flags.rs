//! Parameter 5: boot flags.
//!
//! Reference: IPMI 2.0, Table 28-14, parameter #5.

use crate::{
    connection::CompletionCode,
    dispatch::{Context, Request},
    fmt::{LogItem, Loggable, Logger},
    machine::BootDevice,
};

use super::{zero_extended, ParameterSelector};

bitflags::bitflags! {
    pub struct BootParam: u8 {
        const VALID = 1 << 7;
        const PERSISTENT = 1 << 6;
        const EFI = 1 << 5;
    }
}

bitflags::bitflags! {
    /// The flag bits of the boot device byte. Bits 5 to 2 carry the
    /// [`DeviceSelector`].
    pub struct BootDeviceFlags: u8 {
        const CMOS_CLEAR = 1 << 7;
        const LOCK_KEYBOARD = 1 << 6;
        const SCREEN_BLANK = 1 << 1;
        const LOCK_RESET = 1 << 0;
    }
}

bitflags::bitflags! {
    /// The flag bits of the BIOS verbosity byte. Bits 6 and 5 carry the
    /// [`FirmwareVerbosity`], bits 1 and 0 the [`ConsoleRedirection`].
    pub struct BiosFlags: u8 {
        const LOCK_VIA_POWER = 1 << 7;
        const PROGRESS_EVENT_TRAP = 1 << 4;
        const PASSWORD_BYPASS = 1 << 3;
        const LOCK_SLEEP = 1 << 2;
    }
}

bitflags::bitflags! {
    /// The flag bits of the BIOS shared mode byte. Bits 1 and 0 carry the
    /// [`MuxControl`].
    pub struct BiosSharedFlags: u8 {
        const OVERRIDE = 1 << 2;
    }
}

const DEVICE_SELECTOR_MASK: u8 = 0x3C;
const FIRMWARE_VERBOSITY_MASK: u8 = 0x60;
const CONSOLE_REDIRECTION_MASK: u8 = 0x03;
const MUX_CONTROL_MASK: u8 = 0x03;

/// The boot device requested through bits 5 to 2 of the boot device byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSelector {
    NoOverride,
    Pxe,
    Hdd,
    HddSafeMode,
    DiagnosticPartition,
    Cd,
    BiosSetup,
    RemoteFloppy,
    RemoteMedia,
    RemoteCd,
    RemoteHdd,
    Reserved(u8),
}

/// What a [`DeviceSelector`] does to the simulated machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEffect {
    /// Switch the machine to this boot device.
    Set(BootDevice),
    /// A defined selector without a simulated counterpart.
    Ignored,
    /// A reserved selector value.
    Unrecognized,
}

impl From<u8> for DeviceSelector {
    /// Only the lowest 4 bits of `value` are used.
    fn from(value: u8) -> Self {
        match value & 0x0F {
            0x00 => Self::NoOverride,
            0x01 => Self::Pxe,
            0x02 => Self::Hdd,
            0x03 => Self::HddSafeMode,
            0x04 => Self::DiagnosticPartition,
            0x05 => Self::Cd,
            0x06 => Self::BiosSetup,
            0x07 => Self::RemoteFloppy,
            0x08 => Self::RemoteMedia,
            0x09 => Self::RemoteCd,
            0x0B => Self::RemoteHdd,
            v => Self::Reserved(v),
        }
    }
}

impl From<DeviceSelector> for u8 {
    fn from(value: DeviceSelector) -> Self {
        match value {
            DeviceSelector::NoOverride => 0x00,
            DeviceSelector::Pxe => 0x01,
            DeviceSelector::Hdd => 0x02,
            DeviceSelector::HddSafeMode => 0x03,
            DeviceSelector::DiagnosticPartition => 0x04,
            DeviceSelector::Cd => 0x05,
            DeviceSelector::BiosSetup => 0x06,
            DeviceSelector::RemoteFloppy => 0x07,
            DeviceSelector::RemoteMedia => 0x08,
            DeviceSelector::RemoteCd => 0x09,
            DeviceSelector::RemoteHdd => 0x0B,
            DeviceSelector::Reserved(v) => v & 0x0F,
        }
    }
}

impl DeviceSelector {
    pub fn effect(&self) -> DeviceEffect {
        match self {
            DeviceSelector::Pxe => DeviceEffect::Set(BootDevice::Pxe),
            DeviceSelector::Hdd => DeviceEffect::Set(BootDevice::Disk),
            DeviceSelector::Cd => DeviceEffect::Set(BootDevice::OpticalDisc),
            DeviceSelector::NoOverride
            | DeviceSelector::HddSafeMode
            | DeviceSelector::DiagnosticPartition
            | DeviceSelector::BiosSetup
            | DeviceSelector::RemoteFloppy
            | DeviceSelector::RemoteMedia
            | DeviceSelector::RemoteCd
            | DeviceSelector::RemoteHdd => DeviceEffect::Ignored,
            DeviceSelector::Reserved(_) => DeviceEffect::Unrecognized,
        }
    }
}

impl core::fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DeviceSelector::NoOverride => write!(f, "No override"),
            DeviceSelector::Pxe => write!(f, "Force PXE"),
            DeviceSelector::Hdd => write!(f, "Force HDD"),
            DeviceSelector::HddSafeMode => write!(f, "Force HDD, safe mode"),
            DeviceSelector::DiagnosticPartition => write!(f, "Force diagnostic partition"),
            DeviceSelector::Cd => write!(f, "Force CD/DVD"),
            DeviceSelector::BiosSetup => write!(f, "Force BIOS setup"),
            DeviceSelector::RemoteFloppy => write!(f, "Force remote floppy/primary removable media"),
            DeviceSelector::RemoteMedia => write!(f, "Force remote primary media"),
            DeviceSelector::RemoteCd => write!(f, "Force remote CD/DVD"),
            DeviceSelector::RemoteHdd => write!(f, "Force remote HDD"),
            DeviceSelector::Reserved(v) => write!(f, "Reserved (0x{v:02X})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareVerbosity {
    SystemDefault,
    Quiet,
    Verbose,
    Reserved,
}

impl From<u8> for FirmwareVerbosity {
    /// Only the lowest 2 bits of `value` are used.
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::SystemDefault,
            1 => Self::Quiet,
            2 => Self::Verbose,
            _ => Self::Reserved,
        }
    }
}

impl core::fmt::Display for FirmwareVerbosity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FirmwareVerbosity::SystemDefault => write!(f, "System default"),
            FirmwareVerbosity::Quiet => write!(f, "Quiet"),
            FirmwareVerbosity::Verbose => write!(f, "Verbose"),
            FirmwareVerbosity::Reserved => write!(f, "Reserved"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleRedirection {
    PerBiosSetting,
    Suppress,
    Enable,
    Reserved,
}

impl From<u8> for ConsoleRedirection {
    /// Only the lowest 2 bits of `value` are used.
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::PerBiosSetting,
            1 => Self::Suppress,
            2 => Self::Enable,
            _ => Self::Reserved,
        }
    }
}

impl core::fmt::Display for ConsoleRedirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConsoleRedirection::PerBiosSetting => write!(f, "Per BIOS setting"),
            ConsoleRedirection::Suppress => write!(f, "Suppressed"),
            ConsoleRedirection::Enable => write!(f, "Enabled"),
            ConsoleRedirection::Reserved => write!(f, "Reserved"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxControl {
    Recommended,
    ToBmc,
    ToSystem,
    Reserved,
}

impl From<u8> for MuxControl {
    /// Only the lowest 2 bits of `value` are used.
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::Recommended,
            1 => Self::ToBmc,
            2 => Self::ToSystem,
            _ => Self::Reserved,
        }
    }
}

impl core::fmt::Display for MuxControl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MuxControl::Recommended => write!(f, "BIOS recommended"),
            MuxControl::ToBmc => write!(f, "To BMC"),
            MuxControl::ToSystem => write!(f, "To system"),
            MuxControl::Reserved => write!(f, "Reserved"),
        }
    }
}

/// The five boot flag bytes.
///
/// The raw bytes are kept as received so that reserved bits survive
/// [`BootFlags::to_bytes`]; the accessors decode them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootFlags {
    data: [u8; 5],
}

impl BootFlags {
    pub const LEN: usize = 5;

    pub fn new(param: BootParam, device: DeviceSelector, device_flags: BootDeviceFlags) -> Self {
        let selector: u8 = device.into();

        Self {
            data: [
                param.bits(),
                device_flags.bits() | (selector << 2),
                0,
                0,
                0,
            ],
        }
    }

    /// Valid flags requesting `device` on the next boot only.
    pub fn for_device(device: DeviceSelector) -> Self {
        Self::new(BootParam::VALID, device, BootDeviceFlags::empty())
    }

    /// Missing bytes read as zero, extra bytes are ignored.
    pub fn from_data(data: &[u8]) -> Self {
        if data.len() > Self::LEN {
            log::debug!("Ignoring {} trailing boot flag bytes", data.len() - Self::LEN);
        }

        Self {
            data: zero_extended(data),
        }
    }

    pub fn to_bytes(&self) -> [u8; 5] {
        self.data
    }

    pub fn param(&self) -> BootParam {
        BootParam::from_bits_truncate(self.data[0])
    }

    pub fn device_flags(&self) -> BootDeviceFlags {
        BootDeviceFlags::from_bits_truncate(self.data[1])
    }

    pub fn device(&self) -> DeviceSelector {
        DeviceSelector::from((self.data[1] & DEVICE_SELECTOR_MASK) >> 2)
    }

    pub fn bios_flags(&self) -> BiosFlags {
        BiosFlags::from_bits_truncate(self.data[2])
    }

    pub fn firmware_verbosity(&self) -> FirmwareVerbosity {
        FirmwareVerbosity::from((self.data[2] & FIRMWARE_VERBOSITY_MASK) >> 5)
    }

    pub fn console_redirection(&self) -> ConsoleRedirection {
        ConsoleRedirection::from(self.data[2] & CONSOLE_REDIRECTION_MASK)
    }

    pub fn shared_flags(&self) -> BiosSharedFlags {
        BiosSharedFlags::from_bits_truncate(self.data[3])
    }

    pub fn mux_control(&self) -> MuxControl {
        MuxControl::from(self.data[3] & MUX_CONTROL_MASK)
    }

    pub fn reserved(&self) -> u8 {
        self.data[4]
    }
}

impl Loggable for BootFlags {
    fn as_log(&self) -> Vec<LogItem> {
        let param = self.param();
        let device_flags = self.device_flags();
        let bios = self.bios_flags();
        let shared = self.shared_flags();

        let persistence = if param.contains(BootParam::PERSISTENT) {
            "Persistent"
        } else {
            "Next boot only"
        };

        let boot_type = if param.contains(BootParam::EFI) {
            "EFI"
        } else {
            "PC compatible (legacy)"
        };

        log_vec![
            (0, "Boot flags"),
            (1, "Valid", param.contains(BootParam::VALID)),
            (1, "Persistence", persistence),
            (1, "Boot type", boot_type),
            (1, "Boot device", self.device()),
            (1, "CMOS clear", device_flags.contains(BootDeviceFlags::CMOS_CLEAR)),
            (1, "Lock keyboard", device_flags.contains(BootDeviceFlags::LOCK_KEYBOARD)),
            (1, "Screen blank", device_flags.contains(BootDeviceFlags::SCREEN_BLANK)),
            (1, "Lock reset", device_flags.contains(BootDeviceFlags::LOCK_RESET)),
            (1, "Lock power", bios.contains(BiosFlags::LOCK_VIA_POWER)),
            (1, "Firmware verbosity", self.firmware_verbosity()),
            (1, "Progress event traps", bios.contains(BiosFlags::PROGRESS_EVENT_TRAP)),
            (1, "Password bypass", bios.contains(BiosFlags::PASSWORD_BYPASS)),
            (1, "Lock sleep", bios.contains(BiosFlags::LOCK_SLEEP)),
            (1, "Console redirection", self.console_redirection()),
            (1, "Shared mode override", shared.contains(BiosSharedFlags::OVERRIDE)),
            (1, "Mux control", self.mux_control())
        ]
    }
}

/// Apply the requested boot device to the machine behind the BMC that
/// received the request.
///
/// Unlike the other parameters, a request that cannot be attributed to a
/// machine is dropped without a response.
pub fn handle(ctx: &Context<'_>, request: &Request<'_>, selector: &ParameterSelector<'_>) {
    let machine = match ctx.transport.local_ip() {
        Some(ip) => match ctx.machines.resolve(ip) {
            Some(machine) => machine,
            None => {
                log::warn!("No BMC registered at {ip}, dropping boot flags request");
                return;
            }
        },
        None => {
            log::warn!("Cannot determine local address, dropping boot flags request");
            return;
        }
    };

    let flags = BootFlags::from_data(selector.data);

    Logger::log(&ctx.config.parameter_log, &flags);

    let device = flags.device();
    match device.effect() {
        DeviceEffect::Set(boot_device) => {
            log::info!("Setting boot device to {boot_device}");
            machine.set_boot_device(boot_device);
        }
        DeviceEffect::Ignored => log::info!("Boot device selector '{device}' has no effect"),
        DeviceEffect::Unrecognized => log::warn!("Unrecognized boot device selector: {device}"),
    }

    ctx.respond(request, CompletionCode::Success, &[]);
}

//! The virtual machines behind the simulated BMCs.

use std::{collections::HashMap, net::IpAddr, sync::Arc};

use parking_lot::RwLock;

/// The boot media a simulated machine can actually be switched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootDevice {
    Pxe,
    Disk,
    OpticalDisc,
}

impl core::fmt::Display for BootDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BootDevice::Pxe => write!(f, "PXE"),
            BootDevice::Disk => write!(f, "disk"),
            BootDevice::OpticalDisc => write!(f, "optical disc"),
        }
    }
}

/// A simulated machine whose boot device can be changed.
///
/// Setting the boot device is fire-and-forget: failures are the
/// implementation's to report, they never reach the IPMI client.
pub trait Machine: Send + Sync {
    fn set_boot_device(&self, device: BootDevice);
}

/// Maps the local address a request arrived on to the machine that the BMC
/// at that address manages.
pub trait MachineRegistry: Send + Sync {
    fn resolve(&self, local_ip: IpAddr) -> Option<Arc<dyn Machine>>;
}

/// A [`MachineRegistry`] backed by an in-memory table.
#[derive(Default)]
pub struct BmcRegistry {
    machines: RwLock<HashMap<IpAddr, Arc<dyn Machine>>>,
}

impl BmcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `machine` as managed by the BMC at `ip`, returning the
    /// machine previously registered there.
    pub fn register(&self, ip: IpAddr, machine: Arc<dyn Machine>) -> Option<Arc<dyn Machine>> {
        log::debug!("Registering BMC at {ip}");
        self.machines.write().insert(ip, machine)
    }

    pub fn unregister(&self, ip: IpAddr) -> Option<Arc<dyn Machine>> {
        self.machines.write().remove(&ip)
    }
}

impl MachineRegistry for BmcRegistry {
    fn resolve(&self, local_ip: IpAddr) -> Option<Arc<dyn Machine>> {
        self.machines.read().get(&local_ip).cloned()
    }
}

impl<T: MachineRegistry + ?Sized> MachineRegistry for Arc<T> {
    fn resolve(&self, local_ip: IpAddr) -> Option<Arc<dyn Machine>> {
        (**self).resolve(local_ip)
    }
}

use std::net::{IpAddr, SocketAddr, UdpSocket};

/// The datagram transport a [`Bmc`](crate::Bmc) answers through.
///
/// Sends are best-effort: a failed send is reported but never retried.
pub trait Transport: Sync {
    /// The local IP address the datagram was received on. This is what
    /// identifies the simulated BMC (and therefore the machine) that is
    /// being talked to.
    fn local_ip(&self) -> Option<IpAddr>;

    fn send_to(&self, data: &[u8], destination: SocketAddr) -> std::io::Result<()>;
}

impl Transport for UdpSocket {
    fn local_ip(&self) -> Option<IpAddr> {
        match self.local_addr() {
            Ok(addr) => Some(addr.ip()),
            Err(e) => {
                log::warn!("Could not determine local address of socket: {e}");
                None
            }
        }
    }

    fn send_to(&self, data: &[u8], destination: SocketAddr) -> std::io::Result<()> {
        let sent = UdpSocket::send_to(self, data, destination)?;

        if sent != data.len() {
            log::warn!(
                "Only sent {sent} of {} bytes to {destination}",
                data.len()
            );
        }

        Ok(())
    }
}

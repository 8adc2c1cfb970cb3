//! The IPMI-over-LAN wire format: an RMCP header, an IPMI v1.5 session
//! wrapper and the IPMI message it carries.

mod checksum;
pub use checksum::Checksum;

mod header;
pub use header::{RmcpClass, RmcpHeader, RmcpHeaderError, RmcpType};

mod message;
pub use message::MessageError;

mod wrapper;
pub use wrapper::{SessionWrapper, WrapperError};

use crate::{connection::Message, DecodeError, EncodeError};

/// A decoded IPMI datagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet<'a> {
    pub wrapper: SessionWrapper,
    pub message: Message,
    /// The IPMI message exactly as received. Authentication codes are
    /// computed over these bytes.
    pub payload: &'a [u8],
}

/// Decode a datagram, keeping the received message bytes.
pub fn decode_packet(data: &[u8]) -> Result<Packet<'_>, DecodeError> {
    let (header, data) = RmcpHeader::from_bytes(data)?;

    if header.class.ty != RmcpType::Ipmi || header.class.is_ack {
        return Err(DecodeError::NotIpmi(header.class));
    }

    let (wrapper, payload) = SessionWrapper::from_bytes(data)?;
    let message = Message::from_bytes(payload)?;

    Ok(Packet {
        wrapper,
        message,
        payload,
    })
}

/// Decode a datagram into its session wrapper and IPMI message.
pub fn decode(data: &[u8]) -> Result<(SessionWrapper, Message), DecodeError> {
    decode_packet(data).map(|packet| (packet.wrapper, packet.message))
}

/// Encode `message` in `wrapper` behind an IPMI RMCP header.
///
/// The authentication code is taken from `wrapper` as-is, so it must already
/// have been computed over [`Message::to_bytes`].
pub fn encode(wrapper: &SessionWrapper, message: &Message) -> Result<Vec<u8>, EncodeError> {
    let payload = message.to_bytes();

    let mut buffer = Vec::with_capacity(RmcpHeader::LEN + 26 + payload.len() + 1);
    RmcpHeader::new_ipmi().write(&mut buffer);
    wrapper.write(&payload, &mut buffer)?;

    Ok(buffer)
}

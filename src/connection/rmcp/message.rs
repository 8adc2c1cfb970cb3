use crate::connection::{Address, Endpoint, LogicalUnit, Message};

use super::checksum::Checksum;

/// Destination address, netfn/LUN, checksum, source address, seq/LUN, command.
const HEADER_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageError {
    /// There is not enough data to form the fixed part of an IPMI message.
    NotEnoughData,
}

impl Message {
    /// Serialize this message the way it is carried inside a session
    /// wrapper, including both checksums.
    pub fn to_bytes(&self) -> Vec<u8> {
        let destination = self.destination();
        let source = self.source();

        let head = [
            destination.address.0,
            (self.netfn_raw() << 2) | destination.lun.value(),
        ];

        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data().len() + 1);
        bytes.extend_from_slice(&head);
        bytes.push(Checksum::of(&head));

        let body_start = bytes.len();
        bytes.push(source.address.0);
        bytes.push((self.seq() << 2) | source.lun.value());
        bytes.push(self.cmd());
        bytes.extend_from_slice(self.data());

        let body_checksum = Checksum::of(&bytes[body_start..]);
        bytes.push(body_checksum);

        bytes
    }

    /// Parse a message from a session payload.
    ///
    /// Checksum mismatches are reported but tolerated, as is a missing
    /// trailing checksum. Only a payload too short to contain the command
    /// byte is an error.
    pub fn from_bytes(data: &[u8]) -> Result<Self, MessageError> {
        if data.len() < HEADER_LEN {
            return Err(MessageError::NotEnoughData);
        }

        let header_checksum = Checksum::of(&data[..2]);
        if header_checksum != data[2] {
            log::warn!(
                "IPMI message header checksum mismatch (expected 0x{header_checksum:02X}, got 0x{:02X})",
                data[2]
            );
        }

        let message_data = if data.len() == HEADER_LEN {
            log::warn!("IPMI message is missing its trailing checksum");
            &[][..]
        } else {
            let (body, checksum) = data[3..].split_at(data.len() - 4);
            let body_checksum = Checksum::of(body);

            if body_checksum != checksum[0] {
                log::warn!(
                    "IPMI message body checksum mismatch (expected 0x{body_checksum:02X}, got 0x{:02X})",
                    checksum[0]
                );
            }

            &data[HEADER_LEN..data.len() - 1]
        };

        let destination = Endpoint::new(Address(data[0]), LogicalUnit::from_low_bits(data[1]));
        let source = Endpoint::new(Address(data[3]), LogicalUnit::from_low_bits(data[4]));

        Ok(Message::new_raw(
            destination,
            source,
            data[4] >> 2,
            data[1] >> 2,
            data[5],
            message_data.to_vec(),
        ))
    }
}

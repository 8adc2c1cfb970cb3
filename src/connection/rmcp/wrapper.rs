use crate::session::auth::{AuthCode, AuthType};

/// The auth type byte that introduces an IPMI v2.0 (RMCP+) session header.
const IPMI_V2_0_FORMAT: u8 = 0x06;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WrapperError {
    /// There is not enough data in the packet to form a session wrapper.
    NotEnoughData,
    /// The auth type provided is not supported.
    UnsupportedAuthType(u8),
    /// The packet uses the IPMI v2.0 (RMCP+) session format.
    Ipmi2_0,
    /// The payload does not fit in the single-byte length field.
    PayloadTooLarge(usize),
}

/// The IPMI v1.5 session header that wraps every message sent over LAN.
///
/// The authentication code is present on the wire if and only if
/// `auth_type` is not [`AuthType::None`]. The payload length is derived
/// from the wrapped message and is not stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionWrapper {
    pub auth_type: AuthType,
    pub sequence_number: u32,
    pub session_id: u32,
    pub auth_code: Option<AuthCode>,
}

impl SessionWrapper {
    /// A wrapper for traffic outside of any session.
    pub fn sessionless() -> Self {
        Self {
            auth_type: AuthType::None,
            sequence_number: 0,
            session_id: 0,
            auth_code: None,
        }
    }

    pub fn write(&self, payload: &[u8], buffer: &mut Vec<u8>) -> Result<(), WrapperError> {
        if payload.len() > u8::MAX as usize {
            return Err(WrapperError::PayloadTooLarge(payload.len()));
        }

        buffer.push(self.auth_type.into());
        buffer.extend_from_slice(&self.sequence_number.to_le_bytes());
        buffer.extend_from_slice(&self.session_id.to_le_bytes());

        if self.auth_type != AuthType::None {
            buffer.extend_from_slice(&self.auth_code.unwrap_or_default());
        }

        buffer.push(payload.len() as u8);
        buffer.extend_from_slice(payload);

        // Legacy PAD
        buffer.push(0);

        Ok(())
    }

    /// Parse a session wrapper, returning it and the payload it carries.
    ///
    /// A payload shorter than the declared length is returned as-is.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, &[u8]), WrapperError> {
        if data.len() < 10 {
            return Err(WrapperError::NotEnoughData);
        }

        if data[0] == IPMI_V2_0_FORMAT {
            return Err(WrapperError::Ipmi2_0);
        }

        let auth_type =
            AuthType::try_from(data[0]).map_err(|_| WrapperError::UnsupportedAuthType(data[0]))?;

        let sequence_number = u32::from_le_bytes([data[1], data[2], data[3], data[4]]);
        let session_id = u32::from_le_bytes([data[5], data[6], data[7], data[8]]);

        let (auth_code, data) = if auth_type == AuthType::None {
            (None, &data[9..])
        } else {
            if data.len() < 26 {
                return Err(WrapperError::NotEnoughData);
            }

            let mut auth_code = [0u8; 16];
            auth_code.copy_from_slice(&data[9..25]);
            (Some(auth_code), &data[25..])
        };

        let payload_len = data[0] as usize;
        let data = &data[1..];

        let payload = if data.len() < payload_len {
            log::warn!(
                "Session payload truncated: expected {payload_len} bytes, got {}",
                data.len()
            );
            data
        } else {
            // Anything beyond the declared length is legacy PAD.
            &data[..payload_len]
        };

        Ok((
            Self {
                auth_type,
                sequence_number,
                session_id,
                auth_code,
            },
            payload,
        ))
    }
}

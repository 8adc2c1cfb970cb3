//! IPMI v1.5 per-message authentication codes.

use md2::{Digest, Md2};

use super::Password;

/// A 16-byte IPMI v1.5 authentication code.
pub type AuthCode = [u8; 16];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    None,
    MD2,
    MD5,
    /// Straight password/key.
    Key,
}

impl TryFrom<u8> for AuthType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let value = match value {
            0x00 => Self::None,
            0x01 => Self::MD2,
            0x02 => Self::MD5,
            0x04 => Self::Key,
            _ => return Err(()),
        };

        Ok(value)
    }
}

impl From<AuthType> for u8 {
    fn from(value: AuthType) -> Self {
        match value {
            AuthType::None => 0x00,
            AuthType::MD2 => 0x01,
            AuthType::MD5 => 0x02,
            AuthType::Key => 0x04,
        }
    }
}

fn calculate_md2(password: &Password, session_id: u32, session_seq: u32, data: &[u8]) -> AuthCode {
    let mut hasher = Md2::new();
    hasher.update(password.as_bytes());
    hasher.update(session_id.to_le_bytes());
    hasher.update(data);
    hasher.update(session_seq.to_le_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn calculate_md5(password: &Password, session_id: u32, session_seq: u32, data: &[u8]) -> AuthCode {
    let mut context = md5::Context::new();
    context.consume(password.as_bytes());
    context.consume(session_id.to_le_bytes());
    context.consume(data);
    context.consume(session_seq.to_le_bytes());
    context.consume(password.as_bytes());
    context.compute().0
}

/// Compute the authentication code for `message` (the serialized IPMI
/// message) sent in session `session_id` with sequence number `sequence`.
///
/// Returns `None` for [`AuthType::None`], which carries no code.
pub fn compute(
    auth_type: AuthType,
    password: &Password,
    session_id: u32,
    message: &[u8],
    sequence: u32,
) -> Option<AuthCode> {
    match auth_type {
        AuthType::None => None,
        AuthType::MD2 => Some(calculate_md2(password, session_id, sequence, message)),
        AuthType::MD5 => Some(calculate_md5(password, session_id, sequence, message)),
        AuthType::Key => Some(*password.as_bytes()),
    }
}

/// Compare a received code with the expected one. Codes are absent for
/// [`AuthType::None`], so two absent codes match.
///
/// The comparison always inspects every byte.
pub fn verify(code: Option<&AuthCode>, expected: Option<&AuthCode>) -> bool {
    match (code, expected) {
        (None, None) => true,
        (Some(code), Some(expected)) => {
            code.iter()
                .zip(expected.iter())
                .fold(0u8, |diff, (a, b)| diff | (a ^ b))
                == 0
        }
        _ => false,
    }
}

/// The RMCP version byte for RMCP 1.0, the only version IPMI uses.
pub const RMCP_VERSION: u8 = 0x06;

/// The RMCP sequence number that requests no RMCP-level ACK. IPMI
/// traffic always uses it.
pub const RMCP_NO_ACK_SEQUENCE: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RmcpType {
    Asf,
    Ipmi,
    OemDefined,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmcpClass {
    pub ty: RmcpType,
    pub is_ack: bool,
}

impl From<RmcpClass> for u8 {
    fn from(value: RmcpClass) -> Self {
        let ack_bit = (value.is_ack as u8) << 7;

        let value = match value.ty {
            RmcpType::Asf => 0x06,
            RmcpType::Ipmi => 0x07,
            RmcpType::OemDefined => 0x08,
        };

        value | ack_bit
    }
}

impl TryFrom<u8> for RmcpClass {
    type Error = RmcpHeaderError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let is_ack = (value & 0x80) == 0x80;

        let ty = match value & 0x7F {
            0x06 => RmcpType::Asf,
            0x07 => RmcpType::Ipmi,
            0x08 => RmcpType::OemDefined,
            _ => return Err(RmcpHeaderError::InvalidRmcpClass(value)),
        };

        Ok(Self { is_ack, ty })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RmcpHeaderError {
    /// There was not enough data in the packet to parse an RMCP header.
    NotEnoughData,
    /// The RMCP version is not 1.0.
    UnsupportedVersion(u8),
    /// The class of the RMCP packet was not valid.
    InvalidRmcpClass(u8),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RmcpHeader {
    pub version: u8,
    pub sequence_number: u8,
    pub class: RmcpClass,
}

impl RmcpHeader {
    pub const LEN: usize = 4;

    /// The header that precedes every IPMI session packet.
    pub fn new_ipmi() -> Self {
        Self {
            version: RMCP_VERSION,
            sequence_number: RMCP_NO_ACK_SEQUENCE,
            class: RmcpClass {
                ty: RmcpType::Ipmi,
                is_ack: false,
            },
        }
    }

    pub fn write(&self, buffer: &mut Vec<u8>) {
        // Byte 1 is reserved.
        buffer.extend_from_slice(&[self.version, 0, self.sequence_number, self.class.into()]);
    }

    pub fn from_bytes(data: &[u8]) -> Result<(Self, &[u8]), RmcpHeaderError> {
        if data.len() < Self::LEN {
            return Err(RmcpHeaderError::NotEnoughData);
        }

        let version = data[0];
        if version != RMCP_VERSION {
            return Err(RmcpHeaderError::UnsupportedVersion(version));
        }

        let sequence_number = data[2];
        let class = RmcpClass::try_from(data[3])?;

        Ok((
            Self {
                version,
                sequence_number,
                class,
            },
            &data[Self::LEN..],
        ))
    }
}

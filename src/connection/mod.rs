mod completion_code;
pub use completion_code::CompletionCode;

mod netfn;
pub use netfn::NetFn;

pub mod rmcp;

mod socket;
pub use socket::Transport;

/// The IPMB address of the BMC itself.
pub const BMC_ADDRESS: Address = Address(0x20);

/// The software ID conventionally used by remote consoles.
pub const REMOTE_CONSOLE_ADDRESS: Address = Address(0x81);

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Address(pub u8);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LogicalUnit {
    Zero,
    One,
    Two,
    Three,
}

impl LogicalUnit {
    /// Construct a `LogicalUnit` from the two lowest bits of `value`,
    /// ignoring all other bits.
    pub fn from_low_bits(value: u8) -> Self {
        match value & 0b11 {
            0b00 => Self::Zero,
            0b01 => Self::One,
            0b10 => Self::Two,
            _ => Self::Three,
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            LogicalUnit::Zero => 0,
            LogicalUnit::One => 1,
            LogicalUnit::Two => 2,
            LogicalUnit::Three => 3,
        }
    }
}

impl From<LogicalUnit> for u8 {
    fn from(value: LogicalUnit) -> Self {
        value.value()
    }
}

/// One side of an IPMI message exchange.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Endpoint {
    pub address: Address,
    pub lun: LogicalUnit,
}

impl Endpoint {
    pub const fn new(address: Address, lun: LogicalUnit) -> Self {
        Self { address, lun }
    }
}

/// An IPMI message as carried inside a session wrapper: addressing,
/// network function, command and data.
///
/// The network function is kept raw (including the response bit) so that
/// a decoded message re-encodes to exactly the same bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    destination: Endpoint,
    source: Endpoint,
    seq: u8,
    netfn: u8,
    cmd: u8,
    data: Vec<u8>,
}

impl Message {
    /// A request from a remote console to the BMC.
    pub fn new_request(netfn: NetFn, cmd: u8, data: Vec<u8>) -> Self {
        Self {
            destination: Endpoint::new(BMC_ADDRESS, LogicalUnit::Zero),
            source: Endpoint::new(REMOTE_CONSOLE_ADDRESS, LogicalUnit::Zero),
            seq: 0,
            netfn: netfn.request_value(),
            cmd,
            data,
        }
    }

    pub fn new_raw(
        destination: Endpoint,
        source: Endpoint,
        seq: u8,
        netfn: u8,
        cmd: u8,
        data: Vec<u8>,
    ) -> Self {
        Self {
            destination,
            source,
            seq: seq & 0x3F,
            netfn: netfn & 0x3F,
            cmd,
            data,
        }
    }

    pub fn with_seq(mut self, seq: u8) -> Self {
        self.seq = seq & 0x3F;
        self
    }

    /// Build the response to this message: the addressing is mirrored, the
    /// response bit is set and `completion_code` leads `data`.
    pub fn response(&self, completion_code: CompletionCode, data: &[u8]) -> Self {
        let mut response_data = Vec::with_capacity(1 + data.len());
        response_data.push(completion_code.into());
        response_data.extend_from_slice(data);

        Self {
            destination: self.source,
            source: self.destination,
            seq: self.seq,
            netfn: self.netfn | 0x01,
            cmd: self.cmd,
            data: response_data,
        }
    }

    pub fn destination(&self) -> Endpoint {
        self.destination
    }

    pub fn source(&self) -> Endpoint {
        self.source
    }

    pub fn seq(&self) -> u8 {
        self.seq
    }

    pub fn netfn(&self) -> NetFn {
        NetFn::from_raw(self.netfn).0
    }

    pub fn netfn_raw(&self) -> u8 {
        self.netfn
    }

    pub fn is_response(&self) -> bool {
        NetFn::from_raw(self.netfn).1
    }

    pub fn cmd(&self) -> u8 {
        self.cmd
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

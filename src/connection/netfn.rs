/// An IPMI network function, without the response bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetFn {
    Chassis,
    Bridge,
    SensorEvent,
    App,
    Firmware,
    Storage,
    Transport,
    /// Any other even network function code.
    Unknown(u8),
}

impl NetFn {
    /// Split a raw 6-bit network function into its (even) function
    /// and whether the response bit was set.
    pub fn from_raw(value: u8) -> (Self, bool) {
        let value = value & 0x3F;
        let is_response = value & 0x01 == 0x01;

        let netfn = match value & !0x01 {
            0x00 => Self::Chassis,
            0x02 => Self::Bridge,
            0x04 => Self::SensorEvent,
            0x06 => Self::App,
            0x08 => Self::Firmware,
            0x0A => Self::Storage,
            0x0C => Self::Transport,
            v => Self::Unknown(v),
        };

        (netfn, is_response)
    }

    pub fn request_value(&self) -> u8 {
        match self {
            NetFn::Chassis => 0x00,
            NetFn::Bridge => 0x02,
            NetFn::SensorEvent => 0x04,
            NetFn::App => 0x06,
            NetFn::Firmware => 0x08,
            NetFn::Storage => 0x0A,
            NetFn::Transport => 0x0C,
            NetFn::Unknown(v) => *v & 0x3E,
        }
    }

    pub fn response_value(&self) -> u8 {
        self.request_value() | 0x01
    }
}

impl core::fmt::Display for NetFn {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NetFn::Chassis => write!(f, "Chassis"),
            NetFn::Bridge => write!(f, "Bridge"),
            NetFn::SensorEvent => write!(f, "Sensor/Event"),
            NetFn::App => write!(f, "App"),
            NetFn::Firmware => write!(f, "Firmware"),
            NetFn::Storage => write!(f, "Storage"),
            NetFn::Transport => write!(f, "Transport"),
            NetFn::Unknown(v) => write!(f, "NetFn 0x{v:02X}"),
        }
    }
}

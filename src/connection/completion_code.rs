/// The completion code that leads the data of every IPMI response.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompletionCode {
    Success,
    NodeBusy,
    InvalidCommand,
    InvalidCommandForLun,
    RequestDataTruncated,
    RequestDataLenInvalid,
    ParameterOutOfRange,
    InvalidDataFieldInRequest,
    InsufficientPrivilege,
    CannotExecuteCommandInCurrentState,
    Unspecified,
    /// Any other code, passed through verbatim.
    Other(u8),
}

impl From<u8> for CompletionCode {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Success,
            0xC0 => Self::NodeBusy,
            0xC1 => Self::InvalidCommand,
            0xC2 => Self::InvalidCommandForLun,
            0xC6 => Self::RequestDataTruncated,
            0xC7 => Self::RequestDataLenInvalid,
            0xC9 => Self::ParameterOutOfRange,
            0xCC => Self::InvalidDataFieldInRequest,
            0xD4 => Self::InsufficientPrivilege,
            0xD5 => Self::CannotExecuteCommandInCurrentState,
            0xFF => Self::Unspecified,
            v => Self::Other(v),
        }
    }
}

impl From<CompletionCode> for u8 {
    fn from(value: CompletionCode) -> Self {
        match value {
            CompletionCode::Success => 0x00,
            CompletionCode::NodeBusy => 0xC0,
            CompletionCode::InvalidCommand => 0xC1,
            CompletionCode::InvalidCommandForLun => 0xC2,
            CompletionCode::RequestDataTruncated => 0xC6,
            CompletionCode::RequestDataLenInvalid => 0xC7,
            CompletionCode::ParameterOutOfRange => 0xC9,
            CompletionCode::InvalidDataFieldInRequest => 0xCC,
            CompletionCode::InsufficientPrivilege => 0xD4,
            CompletionCode::CannotExecuteCommandInCurrentState => 0xD5,
            CompletionCode::Unspecified => 0xFF,
            CompletionCode::Other(v) => v,
        }
    }
}

impl CompletionCode {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

use crate::connection::rmcp::{MessageError, RmcpClass, RmcpHeaderError, WrapperError};

/// Why a datagram could not be turned into a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodeError {
    Rmcp(RmcpHeaderError),
    /// The datagram is valid RMCP, but does not carry an IPMI message.
    NotIpmi(RmcpClass),
    Session(WrapperError),
    Message(MessageError),
}

impl From<RmcpHeaderError> for DecodeError {
    fn from(value: RmcpHeaderError) -> Self {
        Self::Rmcp(value)
    }
}

impl From<WrapperError> for DecodeError {
    fn from(value: WrapperError) -> Self {
        Self::Session(value)
    }
}

impl From<MessageError> for DecodeError {
    fn from(value: MessageError) -> Self {
        Self::Message(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodeError {
    Session(WrapperError),
}

impl From<WrapperError> for EncodeError {
    fn from(value: WrapperError) -> Self {
        Self::Session(value)
    }
}

use crate::{
    connection::CompletionCode,
    dispatch::{Context, Request},
};

use super::ParameterSelector;

/// Parameter 0: used to bracket a sequence of parameter writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetInProgressState {
    SetComplete,
    SetInProgress,
    CommitWrite,
    Reserved,
}

impl From<u8> for SetInProgressState {
    /// Only the lowest 2 bits of `value` are used.
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::SetComplete,
            1 => Self::SetInProgress,
            2 => Self::CommitWrite,
            _ => Self::Reserved,
        }
    }
}

impl From<SetInProgressState> for u8 {
    fn from(value: SetInProgressState) -> Self {
        match value {
            SetInProgressState::SetComplete => 0,
            SetInProgressState::SetInProgress => 1,
            SetInProgressState::CommitWrite => 2,
            SetInProgressState::Reserved => 3,
        }
    }
}

impl SetInProgressState {
    /// A missing parameter byte reads as zero.
    pub fn from_data(data: &[u8]) -> Self {
        Self::from(data.first().copied().unwrap_or(0))
    }

    pub fn to_bytes(&self) -> [u8; 1] {
        [(*self).into()]
    }
}

impl core::fmt::Display for SetInProgressState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SetInProgressState::SetComplete => write!(f, "set complete"),
            SetInProgressState::SetInProgress => write!(f, "set in progress"),
            SetInProgressState::CommitWrite => write!(f, "commit write"),
            SetInProgressState::Reserved => write!(f, "reserved"),
        }
    }
}

/// Log the requested state. Nothing is tracked: the simulated BMC applies
/// every write immediately.
pub fn handle(ctx: &Context<'_>, request: &Request<'_>, selector: &ParameterSelector<'_>) {
    let state = SetInProgressState::from_data(selector.data);

    match state {
        SetInProgressState::Reserved => log::warn!("Set In Progress: unrecognized state 0x03"),
        state => log::info!("Set In Progress: {state}"),
    }

    ctx.respond(request, CompletionCode::Success, &[]);
}

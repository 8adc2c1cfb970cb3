use crate::LogOutput;

/// Behaviour switches for a [`Bmc`](crate::Bmc).
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Drop requests whose authentication code does not verify, and requests
    /// for sessions that do not exist, instead of answering them anyway.
    ///
    /// Off by default: the simulator answers regardless and only logs the
    /// failure, which is what existing tooling is tested against.
    pub strict_authentication: bool,
    /// Where decoded boot option parameters are written.
    pub parameter_log: LogOutput,
}

impl Config {
    pub fn with_strict_authentication(mut self, strict: bool) -> Self {
        self.strict_authentication = strict;
        self
    }

    pub fn with_parameter_log(mut self, output: impl Into<LogOutput>) -> Self {
        self.parameter_log = output.into();
        self
    }
}

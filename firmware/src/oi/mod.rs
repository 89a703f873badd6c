//! Serial link to the Create's Open Interface port.

use core::fmt;

use navigation_core::open_interface::OiError;

#[cfg(target_os = "none")]
mod link;

#[cfg(target_os = "none")]
pub use link::OiLink;

/// Why a control cycle ended without a usable sensor frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LinkError {
    /// UART reported an overrun, framing or noise error.
    Uart,
    /// No complete sensor response before the cycle deadline.
    Timeout { received: usize },
    /// A full response arrived but did not decode.
    Frame(OiError),
}

impl From<OiError> for LinkError {
    fn from(value: OiError) -> Self {
        LinkError::Frame(value)
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Uart => f.write_str("UART error"),
            LinkError::Timeout { received } => {
                write!(f, "sensor response timed out after {received} bytes")
            }
            LinkError::Frame(err) => write!(f, "bad sensor frame: {err}"),
        }
    }
}

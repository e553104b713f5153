//! Error types for the FT2232H ports

use nandbang_core::Error as CoreError;
use thiserror::Error;

/// FT2232H specific errors
#[derive(Debug, Error)]
pub enum FtdiError {
    /// Failed to open a channel
    #[error("Failed to open FTDI channel {channel}: {source}")]
    OpenFailed {
        channel: char,
        #[source]
        source: ftdi::Error,
    },

    /// Failed to configure a channel
    #[error("Failed to configure FTDI channel {channel}: {what}: {source}")]
    ConfigFailed {
        channel: char,
        what: &'static str,
        #[source]
        source: ftdi::Error,
    },

    /// USB transfer failed
    #[error("USB transfer on channel {channel} failed: {message}")]
    TransferFailed { channel: char, message: String },

    /// Invalid channel specification
    #[error("Invalid channel '{0}': must be A or B")]
    InvalidChannel(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// USB enumeration error
    #[error("USB error: {0}")]
    UsbError(#[from] nusb::Error),
}

impl From<FtdiError> for CoreError {
    fn from(e: FtdiError) -> Self {
        log::error!("{}", e);
        CoreError::PortError
    }
}

/// Result type for FT2232H operations
pub type Result<T> = std::result::Result<T, FtdiError>;

use thiserror::Error;

/// Failure taxonomy for the dispatch pipeline.
///
/// Every failure below the public sync operations is expressed as one of
/// these variants. The orchestrator converts them into degraded results
/// instead of propagating them, but logs carry [`Error::kind`] so that a
/// missing device, an unsupported protocol, a transport timeout, and an
/// explicit device-side failure stay distinguishable.
#[derive(Error, Debug)]
pub enum Error {
    // Resolution errors
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device {device_id} configuration missing: {detail}")]
    ConfigurationMissing { device_id: String, detail: String },

    #[error("No protocol handler registered for type '{device_type}' / manufacturer '{manufacturer}'")]
    ProtocolUnsupported {
        device_type: String,
        manufacturer: String,
    },

    // Command construction errors
    #[error("Command encoding failed: {0}")]
    CommandBuild(String),

    // Transport errors
    #[error("Connect timeout after {0}ms")]
    ConnectTimeout(u64),

    #[error("Read timeout after {0}ms")]
    ReadTimeout(u64),

    #[error("Transport IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device returned no response")]
    ResponseEmpty,

    // Response errors
    #[error("Response could not be parsed: {0}")]
    ResponseUnparseable(String),

    #[error("Response rejected by handler validation: {0}")]
    ResponseInvalid(String),

    #[error("Device reported failure [{code}]: {message}")]
    BusinessFailure { code: String, message: String },
}

impl Error {
    /// Stable short name for structured log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Error::DeviceNotFound(_) => "device_not_found",
            Error::ConfigurationMissing { .. } => "configuration_missing",
            Error::ProtocolUnsupported { .. } => "protocol_unsupported",
            Error::CommandBuild(_) => "command_build",
            Error::ConnectTimeout(_) | Error::ReadTimeout(_) => "transport_timeout",
            Error::Io(_) => "transport_io",
            Error::ResponseEmpty => "response_empty",
            Error::ResponseUnparseable(_) => "response_unparseable",
            Error::ResponseInvalid(_) => "response_invalid",
            Error::BusinessFailure { .. } => "business_failure",
        }
    }

    /// Returns `true` for timeout variants, regardless of phase.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::ConnectTimeout(_) | Error::ReadTimeout(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

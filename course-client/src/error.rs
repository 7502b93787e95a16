use std::time::Duration;
use thiserror::Error;

/// Represents all the ways an operation of the course client can fail.
#[derive(Error, Debug)]
pub enum Error {
    /// The configured address does not form a valid endpoint URI.
    #[error("invalid course service address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },
    /// The channel to the course service could not be established.
    #[error("failed to connect to course service at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },
    /// The remote side did not answer before the call deadline.
    #[error("deadline exceeded after {0:?}")]
    Timeout(Duration),
    /// The remote call completed with a non-OK gRPC status.
    #[error("remote call failed: {0}")]
    Status(#[from] tonic::Status),
    /// A configuration value could not be parsed.
    #[error("invalid configuration value for {key}: {reason}")]
    Config { key: &'static str, reason: String },
}

impl Error {
    /// Returns `true` when the call was abandoned because its deadline expired.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::Status(status) => status.code() == tonic::Code::DeadlineExceeded,
            _ => false,
        }
    }

    /// The gRPC status code that best describes the failure.
    pub fn code(&self) -> tonic::Code {
        match self {
            Error::InvalidAddress { .. } | Error::Config { .. } => tonic::Code::InvalidArgument,
            Error::Connect { .. } => tonic::Code::Unavailable,
            Error::Timeout(_) => tonic::Code::DeadlineExceeded,
            Error::Status(status) => status.code(),
        }
    }
}

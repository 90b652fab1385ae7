use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    BadEngineHost(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::BadEngineHost(e) => write!(f, "Engine host error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failure reported by an [`EngineClient`](crate::engine_client::EngineClient)
/// before the driver has attached any operation context to it.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine could not be reached (socket missing, connection refused, timeout).
    Unreachable(String),
    /// The engine answered with an error status.
    Status { code: u16, message: String },
    /// The engine reported an error inside a streamed response.
    Stream(String),
    /// The engine answered with something that could not be decoded.
    Decode(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Unreachable(e) => write!(f, "Engine unreachable: {}", e),
            EngineError::Status { code, message } => {
                write!(f, "Engine returned status {}: {}", code, message)
            }
            EngineError::Stream(e) => write!(f, "Engine stream error: {}", e),
            EngineError::Decode(e) => write!(f, "Engine response decode error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<bollard::errors::Error> for EngineError {
    fn from(err: bollard::errors::Error) -> Self {
        use bollard::errors::Error;

        match err {
            Error::DockerResponseServerError {
                status_code,
                message,
            } => EngineError::Status {
                code: status_code,
                message,
            },
            Error::DockerStreamError { error } => EngineError::Stream(error),
            Error::JsonDataError { message, .. } => EngineError::Decode(message),
            Error::JsonSerdeError { err } => EngineError::Decode(err.to_string()),
            other => EngineError::Unreachable(other.to_string()),
        }
    }
}

/// Errors surfaced by the lifecycle driver.
///
/// `EngineUnavailable` is the only transient variant; everything else means the
/// engine was reached and refused or could not satisfy the request.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverError {
    EngineUnavailable(String),
    InvalidConfig(String),
    ContainerNotFound(String),
    ImageNotFound(String),
    NotRunning(String),
    StreamError(String),
    IncompleteResponse(String),
    MalformedResponse(String),
    Rejected { status: u16, message: String },
}

impl DriverError {
    /// Whether retrying the same call unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DriverError::EngineUnavailable(_))
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::EngineUnavailable(e) => write!(f, "Container engine unavailable: {}", e),
            DriverError::InvalidConfig(e) => write!(f, "Invalid container configuration: {}", e),
            DriverError::ContainerNotFound(e) => write!(f, "Container not found: {}", e),
            DriverError::ImageNotFound(e) => write!(f, "Image not found: {}", e),
            DriverError::NotRunning(e) => write!(f, "Container not running: {}", e),
            DriverError::StreamError(e) => write!(f, "Engine stream error: {}", e),
            DriverError::IncompleteResponse(e) => write!(f, "Incomplete engine response: {}", e),
            DriverError::MalformedResponse(e) => write!(f, "Malformed engine response: {}", e),
            DriverError::Rejected { status, message } => {
                write!(f, "Operation rejected by engine ({}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for DriverError {}

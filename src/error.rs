//! Error module for the Rusty Syn library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum SynError {
    /// Error for invalid numeric parameters, e.g., a non-positive time constant or a negative rate.
    InvalidParameter(String),
    /// Error for incompatible time series, e.g., traces of different lengths.
    IncompatibleTraces(String),
    /// Error for empty inputs where at least one sample is required.
    EmptyInput(String),
    /// Error for a reference series that is zero everywhere.
    DegenerateReference(String),
    /// Error for a trace that was not recorded in a simulation output.
    MissingTrace(String),
    /// Error for an unrecognized trace name.
    UnknownTrace(String),
    /// Error for an unrecognized synapse model identifier.
    UnknownModel(String),
    /// Error for an unrecognized receptor family identifier.
    UnknownReceptor(String),
    /// Error for a synapse model used with a receptor family it does not belong to.
    IncompatibleModel(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for SynError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SynError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            SynError::IncompatibleTraces(e) => write!(f, "Incompatible traces: {}", e),
            SynError::EmptyInput(e) => write!(f, "Empty input: {}", e),
            SynError::DegenerateReference(e) => write!(f, "Degenerate reference: {}", e),
            SynError::MissingTrace(e) => write!(f, "Missing trace: {}", e),
            SynError::UnknownTrace(e) => write!(f, "Unknown trace: {}", e),
            SynError::UnknownModel(e) => write!(f, "Unknown synapse model: {}", e),
            SynError::UnknownReceptor(e) => write!(f, "Unknown receptor: {}", e),
            SynError::IncompatibleModel(e) => write!(f, "Incompatible synapse model: {}", e),
            SynError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for SynError {}

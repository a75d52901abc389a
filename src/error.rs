#![warn(missing_docs)]
//! Error structures of the lens system search.
use std::{error::Error, fmt::Display};

/// Application specific Result type
pub type EflResult<T> = std::result::Result<T, EflError>;

/// Errors that can be returned by the search and its building blocks.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum EflError {
    /// a physical quantity became undefined (negative discriminant, division by zero, ...).
    ///
    /// Inside a search these errors only reject a single candidate.
    Domain(String),
    /// malformed input detected before the search is dispatched
    Configuration(String),
    /// a unit of work failed unexpectedly. The search result is discarded.
    Worker(String),
    /// errors while reading or writing files of the command line tool
    Console(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for EflError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Domain(m) => {
                write!(f, "Domain:{m}")
            }
            Self::Configuration(m) => {
                write!(f, "Configuration:{m}")
            }
            Self::Worker(m) => {
                write!(f, "Worker:{m}")
            }
            Self::Console(m) => {
                write!(f, "Console:{m}")
            }
            Self::Other(m) => write!(f, "EflFinder Error:Other:{m}"),
        }
    }
}
impl Error for EflError {}

impl std::convert::From<String> for EflError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn from() {
        let error = EflError::from("test".to_string());
        assert_eq!(error, EflError::Other("test".to_string()));
    }
    #[test]
    fn display() {
        assert_eq!(
            format!("{}", EflError::Domain("test".to_string())),
            "Domain:test"
        );
        assert_eq!(
            format!("{}", EflError::Configuration("test".to_string())),
            "Configuration:test"
        );
        assert_eq!(
            format!("{}", EflError::Worker("test".to_string())),
            "Worker:test"
        );
        assert_eq!(
            format!("{}", EflError::Console("test".to_string())),
            "Console:test"
        );
        assert_eq!(
            format!("{}", EflError::Other("test".to_string())),
            "EflFinder Error:Other:test"
        );
    }
    #[test]
    fn debug() {
        assert_eq!(
            format!("{:?}", EflError::Domain("test".to_string())),
            "Domain(\"test\")"
        );
    }
}

//! Status codes for forwarding-table operations
//!
//! This module defines the status codes returned by the core table and
//! surfaced (with diagnostics attached) by the command layer.

use std::fmt;

/// Status code returned by table operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Status {
    /// Operation completed successfully
    #[default]
    Ok = 0,
    /// Address was not found
    NotFound = 1,
    /// Allocation failed, or no slot could be freed for an insert
    OutOfMemory = 2,
    /// Address is already present in the table
    AlreadyExists = 3,
    /// Invalid argument provided
    InvalidArgument = 4,
}

impl Status {
    /// Check if the status indicates success
    #[inline]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    /// Check if the address was not found
    #[inline]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Status::NotFound)
    }

    /// Check if the status indicates an error
    #[inline]
    pub const fn is_error(&self) -> bool {
        matches!(
            self,
            Status::OutOfMemory | Status::AlreadyExists | Status::InvalidArgument
        )
    }

    /// Get the status as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "Ok",
            Status::NotFound => "NotFound",
            Status::OutOfMemory => "OutOfMemory",
            Status::AlreadyExists => "AlreadyExists",
            Status::InvalidArgument => "InvalidArgument",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_checks() {
        assert!(Status::Ok.is_ok());
        assert!(!Status::Ok.is_error());

        assert!(Status::NotFound.is_not_found());
        assert!(!Status::NotFound.is_error());

        assert!(Status::OutOfMemory.is_error());
        assert!(Status::AlreadyExists.is_error());
        assert!(Status::InvalidArgument.is_error());
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(Status::Ok.as_str(), "Ok");
        assert_eq!(Status::NotFound.as_str(), "NotFound");
        assert_eq!(Status::OutOfMemory.as_str(), "OutOfMemory");
        assert_eq!(Status::AlreadyExists.as_str(), "AlreadyExists");
        assert_eq!(Status::InvalidArgument.as_str(), "InvalidArgument");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", Status::Ok), "Ok");
        assert_eq!(format!("{}", Status::AlreadyExists), "AlreadyExists");
    }

    #[test]
    fn test_status_default() {
        assert_eq!(Status::default(), Status::Ok);
    }
}

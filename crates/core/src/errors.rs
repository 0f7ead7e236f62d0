use thiserror::Error;

use crate::parsing::DateParseError;

pub const MAX_MESSAGE_CHARS: usize = 4_000;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("no message provided")]
    EmptyMessage,
    #[error("message exceeds {max} characters")]
    MessageTooLong { max: usize },
    #[error("invalid date input: {0}")]
    InvalidDateInput(#[from] DateParseError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    /// Rejects blank or oversized chat input before any collaborator is called.
    pub fn check_message(text: &str) -> Result<(), DomainError> {
        if text.trim().is_empty() {
            return Err(Self::EmptyMessage);
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(Self::MessageTooLong { max: MAX_MESSAGE_CHARS });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(domain) => Self::BadRequest {
                message: domain.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Persistence(message) | ApplicationError::Integration(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError, MAX_MESSAGE_CHARS};

    #[test]
    fn blank_message_is_rejected() {
        assert_eq!(DomainError::check_message("   \n"), Err(DomainError::EmptyMessage));
        assert_eq!(DomainError::check_message("red car please"), Ok(()));
    }

    #[test]
    fn oversized_message_is_rejected() {
        let long = "a".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(
            DomainError::check_message(&long),
            Err(DomainError::MessageTooLong { max: MAX_MESSAGE_CHARS })
        );
    }

    #[test]
    fn domain_error_maps_to_bad_request_interface_error() {
        let interface = ApplicationError::from(DomainError::EmptyMessage).into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest { ref message, ref correlation_id }
                if correlation_id == "req-1" && message == "no message provided"
        ));
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn persistence_error_maps_to_service_unavailable() {
        let interface =
            ApplicationError::Persistence("database is locked".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.correlation_id(), "req-3");
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface =
            ApplicationError::Configuration("missing api key".to_owned()).into_interface("req-4");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}

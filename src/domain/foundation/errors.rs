//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors (bad input, never retried)
    ValidationFailed,
    InvalidFormat,

    // Not found errors
    MemberNotFound,
    EventNotFound,
    RegistrationNotFound,
    SubscriptionNotFound,
    PaymentNotFound,

    // Conflict errors (surfaced to the caller, never retried)
    AlreadyRegistered,
    RegistrationClosed,
    EventFull,
    AlreadySubscribed,
    NotSubscribed,
    NotEligible,

    // State errors
    InvalidStateTransition,

    // External collaborator errors
    GatewayUnavailable,

    // Invariant violations (logged and queued, never silently dropped)
    ConsistencyViolation,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// True for conflict-category codes: the caller's request raced or
    /// repeated an earlier one, and retrying the same call cannot succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ErrorCode::AlreadyRegistered
                | ErrorCode::RegistrationClosed
                | ErrorCode::EventFull
                | ErrorCode::AlreadySubscribed
                | ErrorCode::NotSubscribed
                | ErrorCode::NotEligible
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::MemberNotFound => "MEMBER_NOT_FOUND",
            ErrorCode::EventNotFound => "EVENT_NOT_FOUND",
            ErrorCode::RegistrationNotFound => "REGISTRATION_NOT_FOUND",
            ErrorCode::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
            ErrorCode::PaymentNotFound => "PAYMENT_NOT_FOUND",
            ErrorCode::AlreadyRegistered => "ALREADY_REGISTERED",
            ErrorCode::RegistrationClosed => "REGISTRATION_CLOSED",
            ErrorCode::EventFull => "EVENT_FULL",
            ErrorCode::AlreadySubscribed => "ALREADY_SUBSCRIBED",
            ErrorCode::NotSubscribed => "NOT_SUBSCRIBED",
            ErrorCode::NotEligible => "NOT_ELIGIBLE",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::GatewayUnavailable => "GATEWAY_UNAVAILABLE",
            ErrorCode::ConsistencyViolation => "CONSISTENCY_VIOLATION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field)
    }

    /// Creates a database error from an underlying failure.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Creates a consistency-violation error. These are never dropped:
    /// callers log them and record them for manual reconciliation.
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConsistencyViolation, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
